//! Assertion failure records.
//!
//! An [`AssertionFailure`] describes one failed check: what kind of check it
//! was, the actual value, what was expected, and human-readable errors. It is
//! built once, recorded on a chain with [`Chain::fail`](crate::Chain::fail),
//! and handed unchanged to the reporting sink.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UsageError;

/// The level at which a recorded failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The failure fails the test.
    #[default]
    Error,
    /// The failure is only logged.
    Log,
    /// The failure is logged as informational output.
    Info,
}

impl Severity {
    /// Returns `true` if failures at this level fail the test.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns the lowercase name of this level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Log => "log",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of check that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The assertion method itself was misused.
    Usage,
    /// An operation (such as reading a body) could not be performed.
    Operation,
    /// Value has an unexpected type.
    Type,
    /// Value has a type it should not have.
    NotType,
    /// Value is expected to be valid.
    Valid,
    /// Value is expected to be invalid.
    NotValid,
    /// Value is expected to be null.
    Nil,
    /// Value is expected to be non-null.
    NotNil,
    /// Container is expected to be empty.
    Empty,
    /// Container is expected to be non-empty.
    NotEmpty,
    /// Values are expected to be equal.
    Equal,
    /// Values are expected to differ.
    NotEqual,
    /// Value is expected to be less than the expected value.
    Lt,
    /// Value is expected to be less than or equal to the expected value.
    Le,
    /// Value is expected to be greater than the expected value.
    Gt,
    /// Value is expected to be greater than or equal to the expected value.
    Ge,
    /// Value is expected to be within a range.
    InRange,
    /// Value is expected to be outside a range.
    NotInRange,
    /// Value is expected to match a pattern.
    Match,
    /// Value is expected not to match a pattern.
    NotMatch,
    /// Container is expected to contain a key.
    ContainsKey,
    /// Container is expected not to contain a key.
    NotContainsKey,
    /// Container is expected to contain an element.
    ContainsElement,
    /// Container is expected not to contain an element.
    NotContainsElement,
    /// Container is expected to contain a subset.
    ContainsSubset,
    /// Container is expected not to contain a subset.
    NotContainsSubset,
    /// Value is expected to belong to a list.
    Belongs,
    /// Value is expected not to belong to a list.
    NotBelongs,
}

impl FailureKind {
    const fn requires_range(self) -> bool {
        matches!(self, Self::InRange | Self::NotInRange)
    }

    const fn requires_list(self) -> bool {
        matches!(self, Self::Belongs | Self::NotBelongs)
    }

    const fn requires_value(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Lt
                | Self::Le
                | Self::Gt
                | Self::Ge
                | Self::Match
                | Self::NotMatch
                | Self::ContainsKey
                | Self::NotContainsKey
                | Self::ContainsElement
                | Self::NotContainsElement
                | Self::ContainsSubset
                | Self::NotContainsSubset
        )
    }
}

/// The expected side of a failed comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expected {
    /// A single expected value.
    Value {
        /// The value.
        value: Value,
    },
    /// An inclusive range.
    Range {
        /// Lower bound.
        min: Value,
        /// Upper bound.
        max: Value,
    },
    /// A list of allowed (or disallowed) values.
    List {
        /// The values.
        values: Vec<Value>,
    },
}

/// A structured description of one failed check.
///
/// # Example
///
/// ```
/// use elenchus_core::{AssertionFailure, FailureKind};
/// use serde_json::json;
///
/// let failure = AssertionFailure::new(FailureKind::Equal)
///     .actual(json!(1))
///     .expected(json!(2))
///     .error("expected: values are equal");
///
/// assert!(failure.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// What kind of check failed.
    pub kind: FailureKind,
    /// The value that was checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    /// What the value was checked against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Expected>,
    /// A value the check was made relative to (e.g. the container searched).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Value>,
    /// Allowed difference for approximate comparisons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    /// Level the failure is reported at. Filled from the chain if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Human-readable error descriptions.
    pub errors: Vec<String>,
}

impl AssertionFailure {
    /// Creates an empty failure of the given kind.
    #[must_use]
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            actual: None,
            expected: None,
            reference: None,
            delta: None,
            severity: None,
            errors: Vec::new(),
        }
    }

    /// Creates a usage failure with a single error.
    #[must_use]
    pub fn usage(error: impl Into<String>) -> Self {
        Self::new(FailureKind::Usage).error(error)
    }

    /// Sets the actual value.
    #[must_use]
    pub fn actual(mut self, value: impl Into<Value>) -> Self {
        self.actual = Some(value.into());
        self
    }

    /// Sets a single expected value.
    #[must_use]
    pub fn expected(mut self, value: impl Into<Value>) -> Self {
        self.expected = Some(Expected::Value {
            value: value.into(),
        });
        self
    }

    /// Sets an expected inclusive range.
    #[must_use]
    pub fn expected_range(mut self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.expected = Some(Expected::Range {
            min: min.into(),
            max: max.into(),
        });
        self
    }

    /// Sets an expected list of values.
    #[must_use]
    pub fn expected_list(mut self, values: Vec<Value>) -> Self {
        self.expected = Some(Expected::List { values });
        self
    }

    /// Sets the reference value.
    #[must_use]
    pub fn reference(mut self, value: impl Into<Value>) -> Self {
        self.reference = Some(value.into());
        self
    }

    /// Sets the allowed delta.
    #[must_use]
    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Sets the severity explicitly.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Appends an error description.
    #[must_use]
    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    /// Returns the effective severity, defaulting to [`Severity::Error`].
    #[must_use]
    pub fn effective_severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }

    /// Checks that the record is internally consistent.
    pub fn validate(&self) -> Result<(), UsageError> {
        if self.errors.is_empty() {
            return Err(UsageError::invalid_failure(format!(
                "{:?} failure has no errors",
                self.kind
            )));
        }

        if self.errors.iter().any(String::is_empty) {
            return Err(UsageError::invalid_failure(format!(
                "{:?} failure has an empty error",
                self.kind
            )));
        }

        match &self.expected {
            Some(Expected::Range { .. }) if !self.kind.requires_range() => {
                return Err(UsageError::invalid_failure(format!(
                    "{:?} failure must not have a range",
                    self.kind
                )));
            }
            Some(Expected::List { .. }) if !self.kind.requires_list() => {
                return Err(UsageError::invalid_failure(format!(
                    "{:?} failure must not have a list",
                    self.kind
                )));
            }
            Some(Expected::Value { .. }) if !self.kind.requires_value() => {
                return Err(UsageError::invalid_failure(format!(
                    "{:?} failure must not have an expected value",
                    self.kind
                )));
            }
            None if self.kind.requires_range()
                || self.kind.requires_list()
                || self.kind.requires_value() =>
            {
                return Err(UsageError::invalid_failure(format!(
                    "{:?} failure requires an expected value",
                    self.kind
                )));
            }
            _ => {}
        }

        if let Some(delta) = self.delta {
            if !delta.is_finite() || delta < 0.0 {
                return Err(UsageError::invalid_failure(format!(
                    "delta must be finite and non-negative, got {delta}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_fields() {
        let failure = AssertionFailure::new(FailureKind::InRange)
            .actual(json!(11))
            .expected_range(json!(1), json!(10))
            .error("expected: value is within range");

        assert_eq!(failure.actual, Some(json!(11)));
        assert_eq!(
            failure.expected,
            Some(Expected::Range {
                min: json!(1),
                max: json!(10)
            })
        );
        assert!(failure.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_errors() {
        let failure = AssertionFailure::new(FailureKind::NotNil).actual(json!(null));
        assert!(failure.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_error() {
        let failure = AssertionFailure::new(FailureKind::Empty).error("");
        assert!(failure.validate().is_err());
    }

    #[test]
    fn test_validate_range_kind_needs_range() {
        let failure = AssertionFailure::new(FailureKind::InRange)
            .actual(json!(1))
            .expected(json!(2))
            .error("out of range");
        assert!(failure.validate().is_err());
    }

    #[test]
    fn test_validate_belongs_needs_list() {
        let failure = AssertionFailure::new(FailureKind::Belongs)
            .actual(json!("c"))
            .error("not in list");
        assert!(failure.validate().is_err());

        let failure = failure.expected_list(vec![json!("a"), json!("b")]);
        assert!(failure.validate().is_ok());
    }

    #[test]
    fn test_validate_equal_needs_expected() {
        let failure = AssertionFailure::new(FailureKind::Equal)
            .actual(json!(1))
            .error("not equal");
        assert!(failure.validate().is_err());
    }

    #[test]
    fn test_validate_negative_delta() {
        let failure = AssertionFailure::new(FailureKind::Equal)
            .actual(json!(1.0))
            .expected(json!(2.0))
            .delta(-0.5)
            .error("not equal");
        assert!(failure.validate().is_err());
    }

    #[test]
    fn test_usage_failure_is_valid() {
        assert!(AssertionFailure::usage("unexpected empty list argument")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_effective_severity_defaults_to_error() {
        let failure = AssertionFailure::usage("oops");
        assert_eq!(failure.effective_severity(), Severity::Error);
        assert_eq!(
            failure.severity(Severity::Log).effective_severity(),
            Severity::Log
        );
    }

    #[test]
    fn test_failure_serialization() {
        let failure = AssertionFailure::new(FailureKind::Belongs)
            .actual(json!("c"))
            .expected_list(vec![json!("a")])
            .error("expected: value belongs to list");

        let json = serde_json::to_string(&failure).expect("serialization should work");
        assert!(json.contains("\"kind\":\"belongs\""));
        assert!(json.contains("\"type\":\"list\""));
        assert!(!json.contains("\"delta\""));
    }
}
