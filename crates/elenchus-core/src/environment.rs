//! Per-test key/value store.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

/// A key/value store shared by every chain derived from one root.
///
/// Cloning an `Environment` yields another handle to the same store. Use
/// [`Environment::fork`] to get an independent copy, e.g. for a sub-test.
///
/// # Example
///
/// ```
/// use elenchus_core::Environment;
///
/// let env = Environment::new();
/// env.put("token", "abc");
/// assert_eq!(env.get_string("token").as_deref(), Some("abc"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Environment {
    data: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an independent copy of the current contents.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            data: Rc::new(RefCell::new(self.data.borrow().clone())),
        }
    }

    /// Stores a value, replacing any previous one.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.borrow_mut().insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.borrow().get(key).cloned()
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.data.borrow().contains_key(key)
    }

    /// Removes `key`, returning the previous value.
    pub fn delete(&self, key: &str) -> Option<Value> {
        self.data.borrow_mut().remove(key)
    }

    /// Returns all keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.borrow().keys().cloned().collect()
    }

    /// Returns the value under `key` if it is a string.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.data
            .borrow()
            .get(key)
            .and_then(Value::as_str)
            .map(ToString::to_string)
    }

    /// Returns the value under `key` if it is a number.
    #[must_use]
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.data.borrow().get(key).and_then(Value::as_f64)
    }

    /// Returns the value under `key` if it is a boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.borrow().get(key).and_then(Value::as_bool)
    }
}
