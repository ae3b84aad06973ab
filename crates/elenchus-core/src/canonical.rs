//! Canonicalization of checked values.
//!
//! Before comparing, wrappers turn typed Rust values into one canonical
//! [`serde_json::Value`] form so that values of different static types compare
//! equal when they mean the same thing: `5_i32`, `5.0_f32` and `5_u8` all
//! canonicalize to the float `5.0`.
//!
//! Numbers become `f64`. Integers that `f64` cannot hold exactly keep their
//! exact integer form instead of being rounded, and
//! [`canonical_number`] refuses them. Sequences become arrays, structs and
//! maps become objects, everything else passes through.
//!
//! Each function records exactly one failure on the given chain when the
//! input cannot be canonicalized and returns `None` (or `false`).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::chain::Chain;
use crate::failure::{AssertionFailure, FailureKind};

/// Converts a numeric value to `f64`.
///
/// Records a failure and returns `None` for non-numbers (including NaN and
/// infinities, which serialize as `null`) and for integers with no exact
/// `f64` representation.
pub fn canonical_number<T: Serialize + ?Sized>(chain: &Chain, value: &T) -> Option<f64> {
    let value = canonical_value(chain, value)?;

    let number = match &value {
        Value::Number(number) => exact_f64(number),
        _ => None,
    };

    if number.is_none() {
        chain.fail(
            AssertionFailure::new(FailureKind::Valid)
                .actual(value)
                .error("expected: valid number"),
        );
    }
    number
}

/// Converts any serializable value to canonical form.
///
/// The value is serialized to JSON and parsed back, then every number is
/// normalized.
pub fn canonical_value<T: Serialize + ?Sized>(chain: &Chain, value: &T) -> Option<Value> {
    let encoded = match serde_json::to_vec(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            chain.fail(
                AssertionFailure::new(FailureKind::Valid)
                    .error("expected: marshalable value")
                    .error(err.to_string()),
            );
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&encoded) {
        Ok(decoded) => Some(normalize(decoded)),
        Err(err) => {
            chain.fail(
                AssertionFailure::new(FailureKind::Valid)
                    .error("expected: value can be decoded")
                    .error(err.to_string()),
            );
            None
        }
    }
}

/// Converts a value that must be a sequence.
pub fn canonical_array<T: Serialize + ?Sized>(chain: &Chain, value: &T) -> Option<Vec<Value>> {
    match canonical_value(chain, value)? {
        Value::Array(items) => Some(items),
        other => {
            chain.fail(
                AssertionFailure::new(FailureKind::Valid)
                    .actual(other)
                    .error("expected: valid array"),
            );
            None
        }
    }
}

/// Converts a value that must be a string-keyed mapping.
pub fn canonical_object<T: Serialize + ?Sized>(
    chain: &Chain,
    value: &T,
) -> Option<Map<String, Value>> {
    match canonical_value(chain, value)? {
        Value::Object(map) => Some(map),
        other => {
            chain.fail(
                AssertionFailure::new(FailureKind::Valid)
                    .actual(other)
                    .error("expected: valid map"),
            );
            None
        }
    }
}

/// Decodes a canonical value into `target`.
///
/// Integral floats are decoded as integers, so a canonical `5.0` fills an
/// `i32` field. A missing target is a usage failure. Returns `true` if the
/// target was written.
///
/// # Example
///
/// ```
/// use elenchus_core::canonical::{canonical_decode, canonical_value};
/// use elenchus_core::fixtures::recording_chain;
///
/// let (chain, _) = recording_chain();
/// let value = canonical_value(&chain, &[1, 2, 3]).unwrap();
///
/// let mut target: Vec<u8> = Vec::new();
/// assert!(canonical_decode(&chain, &value, Some(&mut target)));
/// assert_eq!(target, vec![1, 2, 3]);
/// ```
pub fn canonical_decode<T: DeserializeOwned>(
    chain: &Chain,
    value: &Value,
    target: Option<&mut T>,
) -> bool {
    let Some(target) = target else {
        chain.fail(AssertionFailure::usage("unexpected nil target argument"));
        return false;
    };

    let decoded = serde_json::to_vec(&integral(value.clone()))
        .and_then(|encoded| serde_json::from_slice::<T>(&encoded));

    match decoded {
        Ok(decoded) => {
            *target = decoded;
            true
        }
        Err(err) => {
            chain.fail(
                AssertionFailure::new(FailureKind::Valid)
                    .actual(value.clone())
                    .error("expected: value can be decoded into target argument")
                    .error(err.to_string()),
            );
            false
        }
    }
}

/// Largest integer magnitude below which every integer is an exact `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn exact_f64(number: &Number) -> Option<f64> {
    if let Some(int) = number.as_i64() {
        let float = int as f64;
        return (float as i128 == i128::from(int)).then_some(float);
    }
    if let Some(uint) = number.as_u64() {
        let float = uint as f64;
        return (float as u128 == u128::from(uint)).then_some(float);
    }
    number.as_f64()
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Number(number) => match exact_f64(&number).and_then(Number::from_f64) {
            Some(float) => Value::Number(float),
            None => Value::Number(number),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        other => other,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integral(value: Value) -> Value {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(float)
                if number.is_f64() && float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER =>
            {
                Value::Number(Number::from(float as i64))
            }
            _ => Value::Number(number),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integral).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, integral(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::recording_chain;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize)]
    struct User {
        name: String,
        age: u8,
        tags: Vec<&'static str>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Decoded {
        name: String,
        age: i32,
        score: f64,
    }

    #[test]
    fn test_numbers_of_different_types_are_equal() {
        let (chain, handler) = recording_chain();

        let a = canonical_number(&chain, &5_i32);
        let b = canonical_number(&chain, &5.0_f32);
        let c = canonical_number(&chain, &5_u8);

        assert_eq!(a, Some(5.0));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(handler.failure_count(), 0);
        assert!(!chain.failed());
    }

    #[test]
    fn test_string_is_not_a_number() {
        let (chain, handler) = recording_chain();

        assert_eq!(canonical_number(&chain, "123"), None);

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.kind, FailureKind::Valid);
        assert_eq!(failures[0].1.errors[0], "expected: valid number");
        assert_eq!(failures[0].1.actual, Some(json!("123")));
    }

    #[test]
    fn test_nan_is_not_a_number() {
        let (chain, _) = recording_chain();
        assert_eq!(canonical_number(&chain, &f64::NAN), None);
        assert!(chain.failed());
    }

    #[test]
    fn test_lossy_integer_is_rejected() {
        let (chain, _) = recording_chain();
        assert_eq!(canonical_number(&chain, &(i64::MAX - 1)), None);
        assert!(chain.failed());

        let (chain, _) = recording_chain();
        assert_eq!(canonical_number(&chain, &(1_u64 << 60)), Some(2f64.powi(60)));
        assert_eq!(canonical_number(&chain, &i64::MIN), Some(-(2f64.powi(63))));
        assert!(!chain.failed());
    }

    #[test]
    fn test_value_normalizes_nested_numbers() {
        let (chain, _) = recording_chain();
        let user = User {
            name: "ann".to_string(),
            age: 30,
            tags: vec!["admin"],
        };

        let value = canonical_value(&chain, &user).expect("user is serializable");
        assert_eq!(value, json!({"name": "ann", "age": 30.0, "tags": ["admin"]}));
        assert_ne!(value, json!({"name": "ann", "age": 30, "tags": ["admin"]}));
    }

    #[test]
    fn test_value_keeps_large_integers_exact() {
        let (chain, _) = recording_chain();
        let value = canonical_value(&chain, &[u64::MAX]).expect("serializable");
        assert_eq!(value, json!([u64::MAX]));
    }

    #[test]
    fn test_typed_maps_and_slices_compare_equal() {
        let (chain, _) = recording_chain();
        let map: BTreeMap<&str, i16> = [("a", 1), ("b", 2)].into_iter().collect();
        let from_map = canonical_value(&chain, &map);
        let from_json = canonical_value(&chain, &json!({"a": 1.0, "b": 2}));
        assert_eq!(from_map, from_json);

        let from_slice = canonical_value(&chain, &[1_u32, 2, 3][..]);
        let from_vec = canonical_value(&chain, &vec![1.0_f64, 2.0, 3.0]);
        assert_eq!(from_slice, from_vec);
    }

    #[test]
    fn test_unmarshalable_value() {
        let (chain, handler) = recording_chain();
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys cannot be JSON object keys");

        assert_eq!(canonical_value(&chain, &map), None);

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.errors[0], "expected: marshalable value");
    }

    #[test]
    fn test_array_shape_failures() {
        let (chain, handler) = recording_chain();
        assert_eq!(canonical_array(&chain, "not an array"), None);
        assert_eq!(handler.failure_count(), 1);

        let (chain, handler) = recording_chain();
        assert_eq!(canonical_array(&chain, &None::<Vec<i32>>), None);
        assert_eq!(handler.failure_count(), 1);
        assert_eq!(handler.failures()[0].1.errors[0], "expected: valid array");
    }

    #[test]
    fn test_array_and_object_success() {
        let (chain, _) = recording_chain();
        assert_eq!(
            canonical_array(&chain, &vec![1, 2]),
            Some(vec![json!(1.0), json!(2.0)])
        );

        let object = canonical_object(&chain, &json!({"id": 7})).expect("object");
        assert_eq!(object.get("id"), Some(&json!(7.0)));
        assert!(!chain.failed());
    }

    #[test]
    fn test_object_shape_failure() {
        let (chain, handler) = recording_chain();
        assert_eq!(canonical_object(&chain, &[1, 2]), None);
        assert_eq!(handler.failures()[0].1.errors[0], "expected: valid map");
    }

    #[test]
    fn test_decode_integral_floats_into_integers() {
        let (chain, _) = recording_chain();
        let value =
            canonical_value(&chain, &json!({"name": "bob", "age": 41, "score": 7})).expect("value");

        let mut target = Decoded {
            name: String::new(),
            age: 0,
            score: 0.0,
        };
        assert!(canonical_decode(&chain, &value, Some(&mut target)));
        assert_eq!(
            target,
            Decoded {
                name: "bob".to_string(),
                age: 41,
                score: 7.0,
            }
        );
    }

    #[test]
    fn test_decode_type_mismatch() {
        let (chain, handler) = recording_chain();
        let mut target = 0_i32;
        assert!(!canonical_decode(&chain, &json!("text"), Some(&mut target)));
        assert_eq!(target, 0);
        assert_eq!(
            handler.failures()[0].1.errors[0],
            "expected: value can be decoded into target argument"
        );
    }

    #[test]
    fn test_decode_fractional_into_integer_fails() {
        let (chain, _) = recording_chain();
        let mut target = 0_i64;
        assert!(!canonical_decode(&chain, &json!(1.5), Some(&mut target)));
        assert!(chain.failed());
    }

    #[test]
    fn test_decode_without_target_is_usage_failure() {
        let (chain, handler) = recording_chain();
        assert!(!canonical_decode::<i32>(&chain, &json!(1.0), None));

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.kind, FailureKind::Usage);
    }
}
