//! Assertions on objects.

use elenchus_core::canonical::{canonical_object, canonical_value};
use elenchus_core::{AssertionFailure, Chain, FailureKind};
use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::op::{check, contains_subset, derive, probe};
use crate::{Array, Number, Value, Wrapper};

/// A string-keyed map of canonical values.
///
/// Keys are kept in sorted order.
#[derive(Debug, Clone)]
pub struct Object {
    chain: Chain,
    map: Map<String, Json>,
}

impl Object {
    /// Canonicalizes `value`, which must be a map or struct, and wraps it.
    pub fn new<T: Serialize + ?Sized>(parent: &Chain, value: &T) -> Self {
        derive(parent, "Object()", |op| {
            let map = canonical_object(op, value).unwrap_or_default();
            Self::from_parts(op.fork(), map)
        })
    }

    pub(crate) const fn from_parts(chain: Chain, map: Map<String, Json>) -> Self {
        Self { chain, map }
    }

    /// Returns the canonical map.
    #[must_use]
    pub const fn raw(&self) -> &Map<String, Json> {
        &self.map
    }

    /// Sets the name this object is reported under.
    pub fn alias(&self, name: &str) -> &Self {
        self.chain.set_alias(name);
        self
    }

    /// Returns the keys as an array of strings.
    pub fn keys(&self) -> Array {
        derive(&self.chain, "Keys()", |op| {
            let keys = self.map.keys().cloned().map(Json::String).collect();
            Array::from_parts(op.fork(), keys)
        })
    }

    /// Returns the values as an array, ordered by key.
    pub fn values(&self) -> Array {
        derive(&self.chain, "Values()", |op| {
            Array::from_parts(op.fork(), self.map.values().cloned().collect())
        })
    }

    /// Returns the value under `key`.
    pub fn value(&self, key: &str) -> Value {
        derive(&self.chain, format!("Value({key:?})"), |op| {
            let found = self.map.get(key).cloned();
            if found.is_none() && !op.is_skipped() {
                op.fail(
                    AssertionFailure::new(FailureKind::ContainsKey)
                        .actual(self.map.clone())
                        .expected(key)
                        .error("expected: map contains key"),
                );
            }
            Value::from_parts(op.fork(), found.unwrap_or(Json::Null))
        })
    }

    /// Returns the number of entries.
    #[allow(clippy::cast_precision_loss)]
    pub fn length(&self) -> Number {
        derive(&self.chain, "Length()", |op| {
            Number::from_parts(op.fork(), self.map.len() as f64)
        })
    }

    /// Returns a wrapper per entry, each reported as `Iter["key"]`.
    pub fn iter(&self) -> Vec<(String, Value)> {
        derive(&self.chain, "Iter()", |op| {
            self.map
                .iter()
                .map(|(key, value)| {
                    let chain = op.fork();
                    chain.replace(format!("Iter[{key:?}]"));
                    (key.clone(), Value::from_parts(chain, value.clone()))
                })
                .collect()
        })
    }

    /// Asserts the object has no entries.
    pub fn is_empty(&self) -> &Self {
        check(&self.chain, "IsEmpty()", |op| {
            if !self.map.is_empty() {
                op.fail(
                    AssertionFailure::new(FailureKind::Empty)
                        .actual(self.map.clone())
                        .error("expected: map is empty"),
                );
            }
        });
        self
    }

    /// Asserts the object has at least one entry.
    pub fn not_empty(&self) -> &Self {
        check(&self.chain, "NotEmpty()", |op| {
            if self.map.is_empty() {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEmpty)
                        .actual(Map::new())
                        .error("expected: map is non-empty"),
                );
            }
        });
        self
    }

    /// Asserts the object equals `expected` after canonicalization.
    pub fn is_equal<T: Serialize + ?Sized>(&self, expected: &T) -> &Self {
        check(&self.chain, "IsEqual()", |op| {
            let Some(expected) = canonical_object(op, expected) else {
                return;
            };
            if self.map != expected {
                op.fail(
                    AssertionFailure::new(FailureKind::Equal)
                        .actual(self.map.clone())
                        .expected(expected)
                        .error("expected: maps are equal"),
                );
            }
        });
        self
    }

    /// Asserts the object differs from `unexpected`.
    pub fn not_equal<T: Serialize + ?Sized>(&self, unexpected: &T) -> &Self {
        check(&self.chain, "NotEqual()", |op| {
            let Some(unexpected) = canonical_object(op, unexpected) else {
                return;
            };
            if self.map == unexpected {
                op.fail(
                    AssertionFailure::new(FailureKind::NotEqual)
                        .actual(self.map.clone())
                        .expected(unexpected)
                        .error("expected: maps are non-equal"),
                );
            }
        });
        self
    }

    /// Asserts `key` is present.
    pub fn contains_key(&self, key: &str) -> &Self {
        check(&self.chain, format!("ContainsKey({key:?})"), |op| {
            if !self.map.contains_key(key) {
                op.fail(
                    AssertionFailure::new(FailureKind::ContainsKey)
                        .actual(self.map.clone())
                        .expected(key)
                        .error("expected: map contains key"),
                );
            }
        });
        self
    }

    /// Asserts `key` is absent.
    pub fn not_contains_key(&self, key: &str) -> &Self {
        check(&self.chain, format!("NotContainsKey({key:?})"), |op| {
            if self.map.contains_key(key) {
                op.fail(
                    AssertionFailure::new(FailureKind::NotContainsKey)
                        .actual(self.map.clone())
                        .expected(key)
                        .error("expected: map does not contain key"),
                );
            }
        });
        self
    }

    /// Asserts every entry of `subset` is present, comparing nested objects
    /// recursively.
    pub fn contains_subset<T: Serialize + ?Sized>(&self, subset: &T) -> &Self {
        self.subset("ContainsSubset()", subset, true)
    }

    /// Asserts `subset` is not contained in the object.
    pub fn not_contains_subset<T: Serialize + ?Sized>(&self, subset: &T) -> &Self {
        self.subset("NotContainsSubset()", subset, false)
    }

    /// Runs `assert` on every entry.
    ///
    /// Failures inside `assert` are reported under `Every()["key"]` and mark
    /// this object as failed.
    pub fn every(&self, mut assert: impl FnMut(&str, &Value)) -> &Self {
        check(&self.chain, "Every()", |op| {
            for (key, value) in &self.map {
                let chain = op.enter(format!("[{key:?}]"));
                assert(key, &Value::from_parts(chain.clone(), value.clone()));
                chain.leave();
            }
        });
        self
    }

    /// Returns the entries for which `predicate` returns `true` without any
    /// check inside it failing.
    pub fn filter(&self, mut predicate: impl FnMut(&str, &Value) -> bool) -> Self {
        derive(&self.chain, "Filter()", |op| {
            let mut kept = Map::new();
            if !op.is_skipped() {
                for (key, value) in &self.map {
                    if probe(op, format!("[{key:?}]"), value.clone(), |wrapper| {
                        predicate(key, wrapper)
                    }) {
                        kept.insert(key.clone(), value.clone());
                    }
                }
            }
            Self::from_parts(op.fork(), kept)
        })
    }

    /// Returns the value of the first entry matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&str, &Value) -> bool) -> Value {
        derive(&self.chain, "Find()", |op| {
            if op.is_skipped() {
                return Value::from_parts(op.fork(), Json::Null);
            }
            let found = self.map.iter().find(|(key, value)| {
                probe(op, format!("[{key:?}]"), (*value).clone(), |wrapper| {
                    predicate(key, wrapper)
                })
            });
            match found {
                Some((_, value)) => Value::from_parts(op.fork(), value.clone()),
                None => {
                    op.fail(
                        AssertionFailure::new(FailureKind::Valid)
                            .actual(self.map.clone())
                            .error("expected: at least one map entry matches predicate"),
                    );
                    Value::from_parts(op.fork(), Json::Null)
                }
            }
        })
    }

    /// Asserts no entry matches `predicate`.
    pub fn not_find(&self, mut predicate: impl FnMut(&str, &Value) -> bool) -> &Self {
        check(&self.chain, "NotFind()", |op| {
            let found = self.map.iter().find(|(key, value)| {
                probe(op, format!("[{key:?}]"), (*value).clone(), |wrapper| {
                    predicate(key, wrapper)
                })
            });
            if let Some((key, value)) = found {
                op.fail(
                    AssertionFailure::new(FailureKind::NotContainsElement)
                        .actual(self.map.clone())
                        .expected(value.clone())
                        .error("expected: none of the map entries match predicate")
                        .error(format!("entry with key {key:?} matches predicate")),
                );
            }
        });
        self
    }

    fn subset<T: Serialize + ?Sized>(
        &self,
        segment: &'static str,
        subset: &T,
        positive: bool,
    ) -> &Self {
        check(&self.chain, segment, |op| {
            let Some(subset) = canonical_value(op, subset) else {
                return;
            };
            let actual = Json::Object(self.map.clone());
            if contains_subset(&actual, &subset) == positive {
                return;
            }
            let (kind, error) = if positive {
                (FailureKind::ContainsSubset, "expected: map contains sub-map")
            } else {
                (FailureKind::NotContainsSubset, "expected: map does not contain sub-map")
            };
            op.fail(
                AssertionFailure::new(kind)
                    .actual(actual)
                    .expected(subset)
                    .error(error),
            );
        });
        self
    }
}

impl Wrapper for Object {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn json(&self) -> Json {
        Json::Object(self.map.clone())
    }
}
