//! Assertions on booleans.

use elenchus_core::{AssertionFailure, Chain, FailureKind};
use serde_json::Value as Json;

use crate::op::{check, derive};
use crate::Wrapper;

/// A boolean.
#[derive(Debug, Clone)]
pub struct Boolean {
    chain: Chain,
    value: bool,
}

impl Boolean {
    /// Wraps `value`.
    pub fn new(parent: &Chain, value: bool) -> Self {
        derive(parent, "Boolean()", |op| Self::from_parts(op.fork(), value))
    }

    pub(crate) const fn from_parts(chain: Chain, value: bool) -> Self {
        Self { chain, value }
    }

    /// Returns the boolean.
    #[must_use]
    pub const fn raw(&self) -> bool {
        self.value
    }

    /// Sets the name this boolean is reported under.
    pub fn alias(&self, name: &str) -> &Self {
        self.chain.set_alias(name);
        self
    }

    /// Asserts the boolean is `true`.
    pub fn is_true(&self) -> &Self {
        self.expect("IsTrue()", true, "expected: boolean is true")
    }

    /// Asserts the boolean is `false`.
    pub fn is_false(&self) -> &Self {
        self.expect("IsFalse()", false, "expected: boolean is false")
    }

    /// Asserts the boolean equals `expected`.
    pub fn is_equal(&self, expected: bool) -> &Self {
        self.expect("IsEqual()", expected, "expected: booleans are equal")
    }

    /// Asserts the boolean differs from `unexpected`.
    pub fn not_equal(&self, unexpected: bool) -> &Self {
        check(&self.chain, "NotEqual()", |op| {
            if self.value == unexpected {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEqual)
                        .actual(self.value)
                        .expected(unexpected)
                        .error("expected: booleans are non-equal"),
                );
            }
        });
        self
    }

    fn expect(&self, segment: &'static str, expected: bool, error: &'static str) -> &Self {
        check(&self.chain, segment, |op| {
            if self.value != expected {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.value)
                        .expected(expected)
                        .error(error),
                );
            }
        });
        self
    }
}

impl Wrapper for Boolean {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn json(&self) -> Json {
        Json::Bool(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elenchus_core::fixtures::recording_chain;

    #[test]
    fn test_true_and_false() {
        let (root, handler) = recording_chain();
        let flag = Boolean::new(&root, true);

        flag.is_true().is_equal(true).not_equal(false);
        assert_eq!(handler.failure_count(), 0);

        flag.is_false();
        assert_eq!(handler.failure_paths(), vec!["Boolean().IsFalse()".to_string()]);
        assert!(flag.raw());
    }
}
