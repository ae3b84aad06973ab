//! Assertions on strings.

use elenchus_core::{AssertionFailure, Chain, FailureKind};
use regex::Regex;
use serde_json::Value as Json;

use crate::op::{check, derive};
use crate::{Number, Wrapper};

/// A string.
///
/// Lengths are counted in Unicode scalar values, not bytes.
#[derive(Debug, Clone)]
pub struct StringValue {
    chain: Chain,
    value: String,
}

impl StringValue {
    /// Wraps `value`.
    pub fn new(parent: &Chain, value: impl Into<String>) -> Self {
        let value = value.into();
        derive(parent, "String()", |op| Self::from_parts(op.fork(), value))
    }

    pub(crate) const fn from_parts(chain: Chain, value: String) -> Self {
        Self { chain, value }
    }

    /// Returns the string.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.value
    }

    /// Sets the name this string is reported under.
    pub fn alias(&self, name: &str) -> &Self {
        self.chain.set_alias(name);
        self
    }

    /// Returns the length as a number.
    #[allow(clippy::cast_precision_loss)]
    pub fn length(&self) -> Number {
        derive(&self.chain, "Length()", |op| {
            Number::from_parts(op.fork(), self.value.chars().count() as f64)
        })
    }

    /// Asserts the string is empty.
    pub fn is_empty(&self) -> &Self {
        check(&self.chain, "IsEmpty()", |op| {
            if !self.value.is_empty() {
                op.fail(
                    AssertionFailure::new(FailureKind::Empty)
                        .actual(self.value.as_str())
                        .error("expected: string is empty"),
                );
            }
        });
        self
    }

    /// Asserts the string is not empty.
    pub fn not_empty(&self) -> &Self {
        check(&self.chain, "NotEmpty()", |op| {
            if self.value.is_empty() {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEmpty)
                        .actual(self.value.as_str())
                        .error("expected: string is non-empty"),
                );
            }
        });
        self
    }

    /// Asserts the string equals `expected`.
    pub fn is_equal(&self, expected: &str) -> &Self {
        check(&self.chain, format!("IsEqual({expected:?})"), |op| {
            if self.value != expected {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.value.as_str())
                        .expected(expected)
                        .error("expected: strings are equal"),
                );
            }
        });
        self
    }

    /// Asserts the string differs from `unexpected`.
    pub fn not_equal(&self, unexpected: &str) -> &Self {
        check(&self.chain, format!("NotEqual({unexpected:?})"), |op| {
            if self.value == unexpected {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEqual)
                        .actual(self.value.as_str())
                        .expected(unexpected)
                        .error("expected: strings are non-equal"),
                );
            }
        });
        self
    }

    /// Asserts the string equals `expected` ignoring case.
    pub fn is_equal_fold(&self, expected: &str) -> &Self {
        check(&self.chain, format!("IsEqualFold({expected:?})"), |op| {
            if self.value.to_lowercase() != expected.to_lowercase() {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.value.as_str())
                        .expected(expected)
                        .error("expected: strings are equal (if folded)"),
                );
            }
        });
        self
    }

    /// Asserts the string contains `needle`.
    pub fn contains(&self, needle: &str) -> &Self {
        self.substring(
            format!("Contains({needle:?})"),
            needle,
            self.value.contains(needle),
            true,
            "expected: string contains sub-string",
        )
    }

    /// Asserts the string does not contain `needle`.
    pub fn not_contains(&self, needle: &str) -> &Self {
        self.substring(
            format!("NotContains({needle:?})"),
            needle,
            !self.value.contains(needle),
            false,
            "expected: string does not contain sub-string",
        )
    }

    /// Asserts the string starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> &Self {
        self.substring(
            format!("HasPrefix({prefix:?})"),
            prefix,
            self.value.starts_with(prefix),
            true,
            "expected: string has prefix",
        )
    }

    /// Asserts the string ends with `suffix`.
    pub fn has_suffix(&self, suffix: &str) -> &Self {
        self.substring(
            format!("HasSuffix({suffix:?})"),
            suffix,
            self.value.ends_with(suffix),
            true,
            "expected: string has suffix",
        )
    }

    /// Asserts the string matches the regular expression `pattern`.
    ///
    /// An invalid pattern is reported as a usage failure.
    pub fn matches(&self, pattern: &str) -> &Self {
        check(&self.chain, format!("Matches({pattern:?})"), |op| {
            let regex = match Regex::new(pattern) {
                Ok(regex) => regex,
                Err(err) => {
                    op.fail(
                        AssertionFailure::usage(format!("unexpected invalid regexp: {pattern}"))
                            .error(err.to_string()),
                    );
                    return;
                }
            };
            if !regex.is_match(&self.value) {
                op.fail(
                    AssertionFailure::new(FailureKind::Match)
                        .actual(self.value.as_str())
                        .expected(pattern)
                        .error("expected: string matches regexp"),
                );
            }
        });
        self
    }

    /// Parses the string as a number.
    pub fn as_number(&self) -> Number {
        derive(&self.chain, "AsNumber()", |op| {
            let parsed = self.value.trim().parse::<f64>().ok().filter(|n| n.is_finite());
            if parsed.is_none() && !op.is_skipped() {
                op.fail(
                    AssertionFailure::new(FailureKind::Valid)
                        .actual(self.value.as_str())
                        .error("expected: string can be parsed to number"),
                );
            }
            Number::from_parts(op.fork(), parsed.unwrap_or_default())
        })
    }

    fn substring(
        &self,
        segment: String,
        needle: &str,
        holds: bool,
        positive: bool,
        error: &'static str,
    ) -> &Self {
        check(&self.chain, segment, |op| {
            if holds {
                return;
            }
            let kind = if positive {
                FailureKind::ContainsSubset
            } else {
                FailureKind::NotContainsSubset
            };
            op.fail(
                AssertionFailure::new(kind)
                    .actual(self.value.as_str())
                    .expected(needle)
                    .error(error),
            );
        });
        self
    }
}

impl Wrapper for StringValue {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn json(&self) -> Json {
        Json::String(self.value.clone())
    }
}
