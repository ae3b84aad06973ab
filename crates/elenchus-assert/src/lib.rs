//! # Elenchus Assert
//!
//! Fluent assertion wrappers built on the `elenchus-core` chain.
//!
//! Every wrapper owns a chain. Each assertion enters a child chain named
//! after the call, records a failure on it if the check does not hold, and
//! leaves it again. Derived wrappers (`Value::object`, `Array::element`,
//! `Response::json`, ...) carry on from where their parent left off, so a
//! failure deep in a chain is reported with the full path that led to it:
//!
//! ```text
//! Response().JSON().Object().Value("items").Array().Length().IsEqual(3)
//! ```
//!
//! Once a step fails, everything derived from it is skipped and only the
//! first failure is reported.
//!
//! ## Example
//!
//! ```
//! use elenchus_assert::{Object, Wrapper};
//! use elenchus_core::fixtures::recording_chain;
//! use serde_json::json;
//!
//! let (root, handler) = recording_chain();
//! let user = Object::new(&root, &json!({"id": 7, "tags": ["a", "b"]}));
//!
//! user.value("id").number().is_equal(&7);
//! user.value("tags").array().contains_all(&[json!("a")]);
//! assert_eq!(handler.failure_count(), 0);
//!
//! user.value("id").string();
//! assert_eq!(handler.failure_paths(), vec![r#"Object().Value("id").String()"#]);
//! assert!(user.chain().tree_failed());
//! ```

#![doc(html_root_url = "https://docs.rs/elenchus-assert/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod array;
mod boolean;
mod error;
mod number;
mod object;
mod op;
mod response;
mod string;
mod value;

use elenchus_core::Chain;
use serde_json::Value as Json;

pub use array::Array;
pub use boolean::Boolean;
pub use error::ExpectError;
pub use number::Number;
pub use object::Object;
pub use response::{Response, StatusRange};
pub use string::StringValue;
pub use value::Value;

/// Behaviour shared by every assertion wrapper.
pub trait Wrapper {
    /// Returns the chain this wrapper records failures on.
    fn chain(&self) -> &Chain;

    /// Returns the wrapped value as JSON.
    fn json(&self) -> Json;
}
