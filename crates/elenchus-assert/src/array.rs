//! Assertions on arrays.

use elenchus_core::canonical::{canonical_array, canonical_value};
use elenchus_core::{AssertionFailure, Chain, FailureKind};
use serde::Serialize;
use serde_json::Value as Json;

use crate::op::{check, derive, probe};
use crate::{Number, Value, Wrapper};

/// An array of canonical values.
///
/// # Example
///
/// ```
/// use elenchus_assert::Array;
/// use elenchus_core::fixtures::recording_chain;
///
/// let (root, handler) = recording_chain();
/// let array = Array::new(&root, &[1, 2, 3, 4]);
///
/// let even = array.filter(|_, value| value.raw().as_f64().unwrap_or(1.0) % 2.0 == 0.0);
/// even.length().is_equal(&2);
/// array.every(|_, value| {
///     value.number().gt(&0);
/// });
///
/// assert_eq!(handler.failure_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Array {
    chain: Chain,
    items: Vec<Json>,
}

impl Array {
    /// Canonicalizes `value`, which must be a sequence, and wraps it.
    pub fn new<T: Serialize + ?Sized>(parent: &Chain, value: &T) -> Self {
        derive(parent, "Array()", |op| {
            let items = canonical_array(op, value).unwrap_or_default();
            Self::from_parts(op.fork(), items)
        })
    }

    pub(crate) const fn from_parts(chain: Chain, items: Vec<Json>) -> Self {
        Self { chain, items }
    }

    /// Returns the canonical elements.
    #[must_use]
    pub fn raw(&self) -> &[Json] {
        &self.items
    }

    /// Sets the name this array is reported under.
    pub fn alias(&self, name: &str) -> &Self {
        self.chain.set_alias(name);
        self
    }

    /// Returns the number of elements.
    #[allow(clippy::cast_precision_loss)]
    pub fn length(&self) -> Number {
        derive(&self.chain, "Length()", |op| {
            Number::from_parts(op.fork(), self.items.len() as f64)
        })
    }

    /// Returns the element at `index`.
    pub fn element(&self, index: usize) -> Value {
        derive(&self.chain, format!("Element({index})"), |op| {
            let item = self.items.get(index).cloned();
            if item.is_none() && !op.is_skipped() {
                op.fail(
                    AssertionFailure::new(FailureKind::InRange)
                        .actual(index)
                        .expected_range(0, self.items.len().saturating_sub(1))
                        .error("expected: valid element index"),
                );
            }
            Value::from_parts(op.fork(), item.unwrap_or(Json::Null))
        })
    }

    /// Returns the first element.
    pub fn first(&self) -> Value {
        self.edge("First()", self.items.first())
    }

    /// Returns the last element.
    pub fn last(&self) -> Value {
        self.edge("Last()", self.items.last())
    }

    /// Returns a wrapper per element, each reported as `Iter[i]`.
    pub fn iter(&self) -> Vec<Value> {
        derive(&self.chain, "Iter()", |op| {
            self.items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let chain = op.fork();
                    chain.replace(format!("Iter[{index}]"));
                    Value::from_parts(chain, item.clone())
                })
                .collect()
        })
    }

    /// Asserts the array is empty.
    pub fn is_empty(&self) -> &Self {
        check(&self.chain, "IsEmpty()", |op| {
            if !self.items.is_empty() {
                op.fail(
                    AssertionFailure::new(FailureKind::Empty)
                        .actual(self.items.clone())
                        .error("expected: array is empty"),
                );
            }
        });
        self
    }

    /// Asserts the array is not empty.
    pub fn not_empty(&self) -> &Self {
        check(&self.chain, "NotEmpty()", |op| {
            if self.items.is_empty() {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEmpty)
                        .actual(Json::Array(Vec::new()))
                        .error("expected: array is non-empty"),
                );
            }
        });
        self
    }

    /// Asserts the array equals `expected`, element by element and in order.
    pub fn is_equal<T: Serialize + ?Sized>(&self, expected: &T) -> &Self {
        check(&self.chain, "IsEqual()", |op| {
            let Some(expected) = canonical_array(op, expected) else {
                return;
            };
            if self.items != expected {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.items.clone())
                        .expected(expected)
                        .error("expected: arrays are equal"),
                );
            }
        });
        self
    }

    /// Asserts the array differs from `unexpected`.
    pub fn not_equal<T: Serialize + ?Sized>(&self, unexpected: &T) -> &Self {
        check(&self.chain, "NotEqual()", |op| {
            let Some(unexpected) = canonical_array(op, unexpected) else {
                return;
            };
            if self.items == unexpected {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEqual)
                        .actual(self.items.clone())
                        .expected(unexpected)
                        .error("expected: arrays are non-equal"),
                );
            }
        });
        self
    }

    /// Asserts every value in `values` is an element of the array.
    pub fn contains_all<T: Serialize>(&self, values: &[T]) -> &Self {
        check(&self.chain, "ContainsAll()", |op| {
            let Some(values) = self.list_argument(op, values) else {
                return;
            };
            if let Some(missing) = values.iter().find(|value| !self.items.contains(value)) {
                op.fail(
                    AssertionFailure::new(FailureKind::ContainsElement)
                        .actual(self.items.clone())
                        .expected(missing.clone())
                        .reference(values.clone())
                        .error("expected: array contains element from reference array"),
                );
            }
        });
        self
    }

    /// Asserts at least one value in `values` is not an element of the array.
    pub fn not_contains_all<T: Serialize>(&self, values: &[T]) -> &Self {
        check(&self.chain, "NotContainsAll()", |op| {
            let Some(values) = self.list_argument(op, values) else {
                return;
            };
            if values.iter().all(|value| self.items.contains(value)) {
                op.fail(
                    AssertionFailure::new(FailureKind::NotContainsSubset)
                        .actual(self.items.clone())
                        .expected(values)
                        .error("expected: array does not contain at least one element from reference array"),
                );
            }
        });
        self
    }

    /// Asserts at least one value in `values` is an element of the array.
    pub fn contains_any<T: Serialize>(&self, values: &[T]) -> &Self {
        check(&self.chain, "ContainsAny()", |op| {
            let Some(values) = self.list_argument(op, values) else {
                return;
            };
            if !values.iter().any(|value| self.items.contains(value)) {
                op.fail(
                    AssertionFailure::new(FailureKind::ContainsElement)
                        .actual(self.items.clone())
                        .expected(values)
                        .error("expected: array contains at least one element from reference array"),
                );
            }
        });
        self
    }

    /// Runs `assert` on every element.
    ///
    /// Failures inside `assert` are reported under `Every()[i]` and mark this
    /// array as failed.
    pub fn every(&self, mut assert: impl FnMut(usize, &Value)) -> &Self {
        check(&self.chain, "Every()", |op| {
            for (index, item) in self.items.iter().enumerate() {
                let chain = op.enter(format!("[{index}]"));
                assert(index, &Value::from_parts(chain.clone(), item.clone()));
                chain.leave();
            }
        });
        self
    }

    /// Returns the elements for which `predicate` returns `true` without any
    /// check inside it failing.
    pub fn filter(&self, mut predicate: impl FnMut(usize, &Value) -> bool) -> Self {
        derive(&self.chain, "Filter()", |op| {
            let mut kept = Vec::new();
            if !op.is_skipped() {
                for (index, item) in self.items.iter().enumerate() {
                    if probe(op, format!("[{index}]"), item.clone(), |value| {
                        predicate(index, value)
                    }) {
                        kept.push(item.clone());
                    }
                }
            }
            Self::from_parts(op.fork(), kept)
        })
    }

    /// Returns the first element matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(usize, &Value) -> bool) -> Value {
        derive(&self.chain, "Find()", |op| {
            if op.is_skipped() {
                return Value::from_parts(op.fork(), Json::Null);
            }
            let found = self.items.iter().enumerate().find(|(index, item)| {
                probe(op, format!("[{index}]"), (*item).clone(), |value| {
                    predicate(*index, value)
                })
            });
            match found {
                Some((_, item)) => Value::from_parts(op.fork(), item.clone()),
                None => {
                    op.fail(
                        AssertionFailure::new(FailureKind::Valid)
                            .actual(self.items.clone())
                            .error("expected: at least one array element matches predicate"),
                    );
                    Value::from_parts(op.fork(), Json::Null)
                }
            }
        })
    }

    /// Returns every element matching `predicate`.
    pub fn find_all(&self, mut predicate: impl FnMut(usize, &Value) -> bool) -> Vec<Value> {
        derive(&self.chain, "FindAll()", |op| {
            if op.is_skipped() {
                return Vec::new();
            }
            self.items
                .iter()
                .enumerate()
                .filter(|(index, item)| {
                    probe(op, format!("[{index}]"), (*item).clone(), |value| {
                        predicate(*index, value)
                    })
                })
                .map(|(_, item)| Value::from_parts(op.fork(), item.clone()))
                .collect()
        })
    }

    /// Asserts no element matches `predicate`.
    pub fn not_find(&self, mut predicate: impl FnMut(usize, &Value) -> bool) -> &Self {
        check(&self.chain, "NotFind()", |op| {
            let found = self.items.iter().enumerate().find(|(index, item)| {
                probe(op, format!("[{index}]"), (*item).clone(), |value| {
                    predicate(*index, value)
                })
            });
            if let Some((index, item)) = found {
                op.fail(
                    AssertionFailure::new(FailureKind::NotContainsElement)
                        .actual(self.items.clone())
                        .expected(item.clone())
                        .error("expected: none of the array elements match predicate")
                        .error(format!("element with index {index} matches predicate")),
                );
            }
        });
        self
    }

    fn edge(&self, segment: &'static str, item: Option<&Json>) -> Value {
        derive(&self.chain, segment, |op| {
            if item.is_none() && !op.is_skipped() {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEmpty)
                        .actual(Json::Array(Vec::new()))
                        .error("expected: array is non-empty"),
                );
            }
            Value::from_parts(op.fork(), item.cloned().unwrap_or(Json::Null))
        })
    }

    fn list_argument<T: Serialize>(&self, op: &Chain, values: &[T]) -> Option<Vec<Json>> {
        if values.is_empty() {
            op.fail(AssertionFailure::usage("unexpected empty list argument"));
            return None;
        }
        values
            .iter()
            .map(|value| canonical_value(op, value))
            .collect()
    }
}

impl Wrapper for Array {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn json(&self) -> Json {
        Json::Array(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elenchus_core::fixtures::recording_chain;
    use elenchus_core::Severity;
    use serde_json::json;

    #[test]
    fn test_equality_and_length() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &json!(["a", 1, null]));

        array.is_equal(&("a", 1.0, ())).not_equal(&["a"]);
        array.length().is_equal(&3);
        assert_eq!(handler.failure_count(), 0);

        array.is_equal(&["a"]);
        assert_eq!(handler.failure_count(), 1);
    }

    #[test]
    fn test_not_an_array() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &json!({"a": 1}));
        array.not_empty();

        assert_eq!(handler.failure_paths(), vec!["Array()".to_string()]);
        assert!(array.raw().is_empty());
    }

    #[test]
    fn test_elements() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &[10, 20, 30]);

        array.element(1).is_equal(&20);
        array.first().is_equal(&10);
        array.last().is_equal(&30);
        assert_eq!(handler.failure_count(), 0);

        array.element(3).is_equal(&40);
        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.path_string(), "Array().Element(3)");
        assert_eq!(failures[0].1.kind, FailureKind::InRange);
    }

    #[test]
    fn test_first_of_empty() {
        let (root, handler) = recording_chain();
        Array::new(&root, &Vec::<i32>::new()).first().is_null();
        assert_eq!(handler.failure_paths(), vec!["Array().First()".to_string()]);
    }

    #[test]
    fn test_iter_paths() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &["x", "y"]);

        let items = array.iter();
        assert_eq!(items.len(), 2);
        items[1].is_equal("z");

        assert_eq!(
            handler.failure_paths(),
            vec!["Array().Iter[1].IsEqual()".to_string()]
        );
    }

    #[test]
    fn test_contains() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &[1, 2, 3]);

        array
            .contains_all(&[3, 1])
            .not_contains_all(&[1, 4])
            .contains_any(&[9, 2]);
        assert_eq!(handler.failure_count(), 0);

        array.contains_all(&[1, 5]);
        array.contains_any(&[7, 8]);
        array.contains_all::<i32>(&[]);

        let kinds: Vec<_> = handler.failures().iter().map(|(_, f)| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FailureKind::ContainsElement,
                FailureKind::ContainsElement,
                FailureKind::Usage
            ]
        );
    }

    #[test]
    fn test_every_propagates_failures() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &[1, 2, 3]);

        array.every(|_, value| {
            value.number().le(&2);
        });

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].0.path_string(),
            "Array().Every()[2].Number().Le()"
        );
        assert!(array.chain().tree_failed());
    }

    #[test]
    fn test_filter_does_not_fail_caller() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &json!([1, "two", 3]));

        let numbers = array.filter(|_, value| {
            value.number();
            true
        });

        numbers.is_equal(&[1, 3]);
        assert!(!array.chain().tree_failed());
        assert!(!root.tree_failed());

        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.severity, Some(Severity::Log));
        assert_eq!(failures[0].0.path_string(), "Array().Filter()[1].Number()");
    }

    #[test]
    fn test_find() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &json!([{"id": 1}, {"id": 2}]));

        array
            .find(|_, value| value.object().value("id").raw() == &json!(2.0))
            .object()
            .value("id")
            .is_equal(&2);
        assert_eq!(handler.failure_count(), 0);

        array.find(|_, _| false).is_null();
        let failures = handler.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.path_string(), "Array().Find()");
    }

    #[test]
    fn test_find_all_and_not_find() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &[1, 5, 10, 15]);

        let large = array.find_all(|_, value| value.raw().as_f64() > Some(4.0));
        assert_eq!(large.len(), 3);

        array.not_find(|_, value| value.raw() == &json!(100.0));
        assert_eq!(handler.failure_count(), 0);

        array.not_find(|index, _| index == 2);
        let failures = handler.failures();
        assert_eq!(failures[0].1.kind, FailureKind::NotContainsElement);
        assert_eq!(failures[0].1.errors[1], "element with index 2 matches predicate");
    }

    #[test]
    fn test_failed_array_skips_iteration_helpers() {
        let (root, handler) = recording_chain();
        let array = Array::new(&root, &"not an array");

        let mut called = false;
        array.every(|_, _| called = true);
        let _ = array.filter(|_, _| {
            called = true;
            true
        });

        assert!(!called);
        assert_eq!(handler.failure_count(), 1);
    }
}
