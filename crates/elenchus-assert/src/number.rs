//! Assertions on numbers.

use elenchus_core::canonical::canonical_number;
use elenchus_core::{AssertionFailure, Chain, FailureKind};
use serde::Serialize;
use serde_json::Value as Json;

use crate::op::{check, derive};
use crate::Wrapper;

/// A canonical number.
///
/// Every operand is canonicalized before comparison, so `is_equal(&5_u8)`
/// and `is_equal(&5.0_f32)` behave the same.
#[derive(Debug, Clone)]
pub struct Number {
    chain: Chain,
    value: f64,
}

#[derive(Clone, Copy)]
enum Comparison {
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    const fn segment(self) -> &'static str {
        match self {
            Self::Gt => "Gt()",
            Self::Ge => "Ge()",
            Self::Lt => "Lt()",
            Self::Le => "Le()",
        }
    }

    const fn kind(self) -> FailureKind {
        match self {
            Self::Gt => FailureKind::Gt,
            Self::Ge => FailureKind::Ge,
            Self::Lt => FailureKind::Lt,
            Self::Le => FailureKind::Le,
        }
    }

    const fn error(self) -> &'static str {
        match self {
            Self::Gt => "expected: number is larger than value",
            Self::Ge => "expected: number is larger than or equal to value",
            Self::Lt => "expected: number is less than value",
            Self::Le => "expected: number is less than or equal to value",
        }
    }

    fn holds(self, actual: f64, bound: f64) -> bool {
        match self {
            Self::Gt => actual > bound,
            Self::Ge => actual >= bound,
            Self::Lt => actual < bound,
            Self::Le => actual <= bound,
        }
    }
}

impl Number {
    /// Canonicalizes `value` and wraps it.
    pub fn new<T: Serialize + ?Sized>(parent: &Chain, value: &T) -> Self {
        derive(parent, "Number()", |op| {
            let value = canonical_number(op, value).unwrap_or_default();
            Self::from_parts(op.fork(), value)
        })
    }

    pub(crate) const fn from_parts(chain: Chain, value: f64) -> Self {
        Self { chain, value }
    }

    /// Returns the number.
    #[must_use]
    pub const fn raw(&self) -> f64 {
        self.value
    }

    /// Sets the name this number is reported under.
    pub fn alias(&self, name: &str) -> &Self {
        self.chain.set_alias(name);
        self
    }

    /// Asserts the number equals `expected`.
    pub fn is_equal<T: Serialize + ?Sized>(&self, expected: &T) -> &Self {
        check(&self.chain, "IsEqual()", |op| {
            let Some(expected) = canonical_number(op, expected) else {
                return;
            };
            if self.value != expected {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.value)
                        .expected(expected)
                        .error("expected: numbers are equal"),
                );
            }
        });
        self
    }

    /// Asserts the number differs from `unexpected`.
    pub fn not_equal<T: Serialize + ?Sized>(&self, unexpected: &T) -> &Self {
        check(&self.chain, "NotEqual()", |op| {
            let Some(unexpected) = canonical_number(op, unexpected) else {
                return;
            };
            if self.value == unexpected {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEqual)
                        .actual(self.value)
                        .expected(unexpected)
                        .error("expected: numbers are non-equal"),
                );
            }
        });
        self
    }

    /// Asserts `|number - expected| <= delta`.
    pub fn in_delta<T: Serialize + ?Sized>(&self, expected: &T, delta: f64) -> &Self {
        check(&self.chain, format!("InDelta({delta})"), |op| {
            if !delta.is_finite() || delta < 0.0 {
                op.fail(AssertionFailure::usage(format!(
                    "unexpected delta argument: {delta}"
                )));
                return;
            }
            let Some(expected) = canonical_number(op, expected) else {
                return;
            };
            if (self.value - expected).abs() > delta {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.value)
                        .expected(expected)
                        .delta(delta)
                        .error("expected: numbers lie within delta"),
                );
            }
        });
        self
    }

    /// Asserts `min <= number <= max`.
    pub fn in_range<T: Serialize + ?Sized>(&self, min: &T, max: &T) -> &Self {
        self.range("InRange()", min, max, true)
    }

    /// Asserts the number lies outside `[min; max]`.
    pub fn not_in_range<T: Serialize + ?Sized>(&self, min: &T, max: &T) -> &Self {
        self.range("NotInRange()", min, max, false)
    }

    /// Asserts the number is greater than `bound`.
    pub fn gt<T: Serialize + ?Sized>(&self, bound: &T) -> &Self {
        self.compare(Comparison::Gt, bound)
    }

    /// Asserts the number is greater than or equal to `bound`.
    pub fn ge<T: Serialize + ?Sized>(&self, bound: &T) -> &Self {
        self.compare(Comparison::Ge, bound)
    }

    /// Asserts the number is less than `bound`.
    pub fn lt<T: Serialize + ?Sized>(&self, bound: &T) -> &Self {
        self.compare(Comparison::Lt, bound)
    }

    /// Asserts the number is less than or equal to `bound`.
    pub fn le<T: Serialize + ?Sized>(&self, bound: &T) -> &Self {
        self.compare(Comparison::Le, bound)
    }

    /// Asserts the number has no fractional part.
    pub fn is_integer(&self) -> &Self {
        check(&self.chain, "IsInteger()", |op| {
            if self.value.fract() != 0.0 {
                op.fail(
                    AssertionFailure::new(FailureKind::Valid)
                        .actual(self.value)
                        .error("expected: number is integer"),
                );
            }
        });
        self
    }

    fn compare<T: Serialize + ?Sized>(&self, comparison: Comparison, bound: &T) -> &Self {
        check(&self.chain, comparison.segment(), |op| {
            let Some(bound) = canonical_number(op, bound) else {
                return;
            };
            if !comparison.holds(self.value, bound) {
                op.fail(
                    AssertionFailure::new(comparison.kind())
                        .actual(self.value)
                        .expected(bound)
                        .error(comparison.error()),
                );
            }
        });
        self
    }

    fn range<T: Serialize + ?Sized>(
        &self,
        segment: &'static str,
        min: &T,
        max: &T,
        inside: bool,
    ) -> &Self {
        check(&self.chain, segment, |op| {
            let (Some(min), Some(max)) = (canonical_number(op, min), canonical_number(op, max))
            else {
                return;
            };
            let within = min <= self.value && self.value <= max;
            if within == inside {
                return;
            }
            let (kind, error) = if inside {
                (FailureKind::InRange, "expected: number is within range")
            } else {
                (FailureKind::NotInRange, "expected: number is not within range")
            };
            op.fail(
                AssertionFailure::new(kind)
                    .actual(self.value)
                    .expected_range(min, max)
                    .error(error),
            );
        });
        self
    }
}

impl Wrapper for Number {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn json(&self) -> Json {
        Json::from(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elenchus_core::fixtures::recording_chain;
    use elenchus_core::Expected;
    use serde_json::json;

    #[test]
    fn test_equality_across_numeric_types() {
        let (root, handler) = recording_chain();
        let number = Number::new(&root, &5_i32);

        number.is_equal(&5.0_f32).is_equal(&5_u8).not_equal(&6_i64);
        assert_eq!(handler.failure_count(), 0);

        number.is_equal(&6);
        assert_eq!(handler.failure_paths(), vec!["Number().IsEqual()".to_string()]);
    }

    #[test]
    fn test_in_delta() {
        let (root, handler) = recording_chain();
        let number = Number::new(&root, &1.05);

        number.in_delta(&1, 0.1);
        assert_eq!(handler.failure_count(), 0);

        number.in_delta(&1, 0.01);
        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.delta, Some(0.01));
    }

    #[test]
    fn test_negative_delta_is_usage_failure() {
        let (root, handler) = recording_chain();
        Number::new(&root, &1).in_delta(&1, -1.0);

        let failures = handler.failures();
        assert_eq!(failures[0].1.kind, FailureKind::Usage);
    }

    #[test]
    fn test_ranges() {
        let (root, handler) = recording_chain();
        let number = Number::new(&root, &10_u16);

        number.in_range(&1, &10).not_in_range(&11, &20);
        assert_eq!(handler.failure_count(), 0);

        number.in_range(&11, &20);
        let failures = handler.failures();
        assert_eq!(failures[0].1.kind, FailureKind::InRange);
        assert_eq!(
            failures[0].1.expected,
            Some(Expected::Range {
                min: json!(11.0),
                max: json!(20.0)
            })
        );
    }

    #[test]
    fn test_orderings() {
        let (root, handler) = recording_chain();
        let number = Number::new(&root, &3);

        number.gt(&2).ge(&3).lt(&4).le(&3);
        assert_eq!(handler.failure_count(), 0);

        number.gt(&3).lt(&3);
        let kinds: Vec<_> = handler.failures().iter().map(|(_, f)| f.kind).collect();
        assert_eq!(kinds, vec![FailureKind::Gt, FailureKind::Lt]);
    }

    #[test]
    fn test_is_integer() {
        let (root, handler) = recording_chain();
        Number::new(&root, &4.0).is_integer();
        Number::new(&root, &4.5).is_integer();
        assert_eq!(handler.failure_count(), 1);
    }

    #[test]
    fn test_non_number_argument() {
        let (root, handler) = recording_chain();
        Number::new(&root, &1).is_equal("1");

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.errors[0], "expected: valid number");
    }
}
