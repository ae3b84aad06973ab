//! Assertions on an arbitrary JSON value.

use elenchus_core::canonical::{canonical_decode, canonical_value};
use elenchus_core::{AssertionFailure, Chain, FailureKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;

use crate::op::{check, derive, kind_name};
use crate::{Array, Boolean, Number, Object, StringValue, Wrapper};

/// A value of any JSON type.
///
/// Use the conversion methods ([`object`](Value::object),
/// [`array`](Value::array), ...) to reach type-specific assertions.
///
/// # Example
///
/// ```
/// use elenchus_assert::Value;
/// use elenchus_core::fixtures::recording_chain;
/// use serde_json::json;
///
/// let (root, handler) = recording_chain();
/// let value = Value::new(&root, &json!({"id": 7, "name": "ann"}));
///
/// value.object().value("id").number().is_equal(&7);
/// value.path("/name").string().has_prefix("a");
///
/// assert_eq!(handler.failure_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Value {
    chain: Chain,
    value: Json,
}

impl Value {
    /// Canonicalizes `value` and wraps it.
    pub fn new<T: Serialize + ?Sized>(parent: &Chain, value: &T) -> Self {
        derive(parent, "Value()", |op| {
            let value = canonical_value(op, value).unwrap_or(Json::Null);
            Self::from_parts(op.fork(), value)
        })
    }

    pub(crate) const fn from_parts(chain: Chain, value: Json) -> Self {
        Self { chain, value }
    }

    /// Returns the canonical value.
    #[must_use]
    pub fn raw(&self) -> &Json {
        &self.value
    }

    /// Sets the name this value is reported under.
    pub fn alias(&self, name: &str) -> &Self {
        self.chain.set_alias(name);
        self
    }

    /// Looks up a nested value by JSON pointer (`/items/0/id`).
    pub fn path(&self, pointer: &str) -> Self {
        derive(&self.chain, format!("Path({pointer:?})"), |op| {
            let found = self.value.pointer(pointer).cloned();
            if found.is_none() && !op.is_skipped() {
                op.fail(
                    AssertionFailure::new(FailureKind::ContainsKey)
                        .actual(self.value.clone())
                        .expected(pointer)
                        .error("expected: value exists at JSON pointer"),
                );
            }
            Self::from_parts(op.fork(), found.unwrap_or(Json::Null))
        })
    }

    /// Asserts the value is an object and wraps it.
    pub fn object(&self) -> Object {
        derive(&self.chain, "Object()", |op| {
            let map = match &self.value {
                Json::Object(map) => map.clone(),
                other => {
                    self.type_mismatch(op, "object", other);
                    serde_json::Map::new()
                }
            };
            Object::from_parts(op.fork(), map)
        })
    }

    /// Asserts the value is an array and wraps it.
    pub fn array(&self) -> Array {
        derive(&self.chain, "Array()", |op| {
            let items = match &self.value {
                Json::Array(items) => items.clone(),
                other => {
                    self.type_mismatch(op, "array", other);
                    Vec::new()
                }
            };
            Array::from_parts(op.fork(), items)
        })
    }

    /// Asserts the value is a string and wraps it.
    pub fn string(&self) -> StringValue {
        derive(&self.chain, "String()", |op| {
            let text = match &self.value {
                Json::String(text) => text.clone(),
                other => {
                    self.type_mismatch(op, "string", other);
                    String::new()
                }
            };
            StringValue::from_parts(op.fork(), text)
        })
    }

    /// Asserts the value is a number and wraps it.
    pub fn number(&self) -> Number {
        derive(&self.chain, "Number()", |op| {
            let number = match &self.value {
                Json::Number(number) => number.as_f64().unwrap_or_default(),
                other => {
                    self.type_mismatch(op, "number", other);
                    0.0
                }
            };
            Number::from_parts(op.fork(), number)
        })
    }

    /// Asserts the value is a boolean and wraps it.
    pub fn boolean(&self) -> Boolean {
        derive(&self.chain, "Boolean()", |op| {
            let flag = match &self.value {
                Json::Bool(flag) => *flag,
                other => {
                    self.type_mismatch(op, "boolean", other);
                    false
                }
            };
            Boolean::from_parts(op.fork(), flag)
        })
    }

    /// Asserts the value is `null`.
    pub fn is_null(&self) -> &Self {
        check(&self.chain, "IsNull()", |op| {
            if !self.value.is_null() {
                op.fail(
                    AssertionFailure::new(FailureKind::Nil)
                        .actual(self.value.clone())
                        .error("expected: value is null"),
                );
            }
        });
        self
    }

    /// Asserts the value is not `null`.
    pub fn not_null(&self) -> &Self {
        check(&self.chain, "NotNull()", |op| {
            if self.value.is_null() {
                op.fail(
                    AssertionFailure::new(FailureKind::NotNil)
                        .actual(Json::Null)
                        .error("expected: value is not null"),
                );
            }
        });
        self
    }

    /// Asserts the value equals `expected` after canonicalization.
    pub fn is_equal<T: Serialize + ?Sized>(&self, expected: &T) -> &Self {
        check(&self.chain, "IsEqual()", |op| {
            let Some(expected) = canonical_value(op, expected) else {
                return;
            };
            if self.value != expected {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.value.clone())
                        .expected(expected)
                        .error("expected: values are equal"),
                );
            }
        });
        self
    }

    /// Asserts the value differs from `unexpected` after canonicalization.
    pub fn not_equal<T: Serialize + ?Sized>(&self, unexpected: &T) -> &Self {
        check(&self.chain, "NotEqual()", |op| {
            let Some(unexpected) = canonical_value(op, unexpected) else {
                return;
            };
            if self.value == unexpected {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEqual)
                        .actual(self.value.clone())
                        .expected(unexpected)
                        .error("expected: values are non-equal"),
                );
            }
        });
        self
    }

    /// Decodes the value into `target`.
    pub fn decode<T: DeserializeOwned>(&self, target: &mut T) -> &Self {
        check(&self.chain, "Decode()", |op| {
            canonical_decode(op, &self.value, Some(target));
        });
        self
    }

    fn type_mismatch(&self, op: &Chain, expected: &str, actual: &Json) {
        if op.is_skipped() {
            return;
        }
        op.fail(
            AssertionFailure::new(FailureKind::Type)
                .actual(actual.clone())
                .error(format!("expected: value is {expected}"))
                .error(format!("actual type: {}", kind_name(actual))),
        );
    }
}

impl Wrapper for Value {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn json(&self) -> Json {
        self.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elenchus_core::fixtures::recording_chain;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    #[test]
    fn test_is_equal_across_types() {
        let (root, handler) = recording_chain();
        let value = Value::new(&root, &json!([1, 2.0, "x"]));

        value.is_equal(&(1_u8, 2_i64, "x"));
        assert_eq!(handler.failure_count(), 0);

        value.not_equal(&[1, 2, 3]);
        assert_eq!(handler.failure_count(), 0);

        value.is_equal(&[1, 2, 3]);
        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.path_string(), "Value().IsEqual()");
        assert_eq!(failures[0].1.kind, FailureKind::Equal);
    }

    #[test]
    fn test_null_checks() {
        let (root, handler) = recording_chain();
        let null = Value::new(&root, &None::<i32>);
        null.is_null();
        null.not_null();

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.kind, FailureKind::NotNil);
    }

    #[test]
    fn test_type_mismatch_stops_cascade() {
        let (root, handler) = recording_chain();
        let value = Value::new(&root, &"text");

        let object = value.object();
        object.value("id").number().is_equal(&1);
        object.contains_key("id");

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.path_string(), "Value().Object()");
        assert_eq!(failures[0].1.kind, FailureKind::Type);
        assert!(object.chain().failed());
    }

    #[test]
    fn test_path_lookup() {
        let (root, handler) = recording_chain();
        let value = Value::new(&root, &json!({"items": [{"id": 3}]}));

        value.path("/items/0/id").is_equal(&3);
        value.path("/items/1/id").is_null();

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.kind, FailureKind::ContainsKey);
    }

    #[test]
    fn test_decode() {
        let (root, handler) = recording_chain();
        let value = Value::new(&root, &json!({"id": 12, "name": "ann"}));

        let mut user = User::default();
        value.decode(&mut user);
        assert_eq!(
            user,
            User {
                id: 12,
                name: "ann".to_string()
            }
        );

        let mut number = 0_i32;
        value.decode(&mut number);
        assert_eq!(handler.failure_count(), 1);
    }

    #[test]
    fn test_alias_in_reports() {
        let (root, handler) = recording_chain();
        let value = Value::new(&root, &json!(1));
        value.alias("counter");
        value.is_equal(&2);

        let failures = handler.failures();
        assert_eq!(failures[0].0.aliased_path_string(), "counter.IsEqual()");
    }

    #[test]
    fn test_unserializable_input_fails_construction() {
        use std::collections::HashMap;

        let (root, handler) = recording_chain();
        let mut map = HashMap::new();
        map.insert(vec![1], 1);

        let value = Value::new(&root, &map);
        value.is_equal(&1);

        assert_eq!(handler.failure_count(), 1);
        assert_eq!(handler.failure_paths(), vec!["Value()".to_string()]);
        assert!(value.raw().is_null());
    }
}
