//! # Elenchus
//!
//! **Fluent assertions for HTTP responses and JSON values**
//!
//! Every check records where it was made. When one fails, the report names
//! the full path that led to it and stops everything derived from that point
//! from piling on follow-up failures:
//!
//! ```text
//! assertion failed: Response().JSON().Object().Value("items").Array().Length().IsEqual()
//!
//! errors:
//!   expected: numbers are equal
//! ...
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use elenchus::prelude::*;
//! use http::{header, HeaderMap, HeaderValue, StatusCode};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
//! let received = ResponseSnapshot::new(StatusCode::OK, headers, r#"{"items":[{"id":1},{"id":2}]}"#);
//!
//! let e = Expect::new();
//! let items = e
//!     .response(received)
//!     .status(StatusCode::OK)
//!     .json()
//!     .object()
//!     .value("items")
//!     .array();
//!
//! items.length().is_equal(&2);
//! items.every(|_, item| {
//!     item.object().contains_key("id");
//! });
//! ```
//!
//! ## Crates
//!
//! ```text
//! elenchus            Expect entry point, prelude
//! ├── elenchus-assert     Value, Object, Array, StringValue, Number, Boolean, Response
//! ├── elenchus-core       Chain, failure records, canonical values, reporting
//! ├── elenchus-config     ElenchusConfig and ConfigLoader
//! └── elenchus-telemetry  tracing subscriber setup, TracingLogger
//! ```

#![doc(html_root_url = "https://docs.rs/elenchus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod expect;

pub use error::{Error, Result};
pub use expect::{setup_logging, Expect, CONFIG_FILE};

// Re-export member crates
pub use elenchus_assert as assert;
pub use elenchus_config as config;
pub use elenchus_core as core;
pub use elenchus_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use elenchus::prelude::*;
///
/// Expect::new().string("ok").is_equal("ok");
/// ```
pub mod prelude {
    pub use crate::Expect;

    pub use elenchus_assert::{
        Array, Boolean, Number, Object, Response, StatusRange, StringValue, Value, Wrapper,
    };

    pub use elenchus_config::{ConfigLoader, ElenchusConfig};

    pub use elenchus_core::{
        AssertionFailure, Chain, Environment, FailureKind, RequestSnapshot, ResponseSnapshot,
        Severity,
    };
}
