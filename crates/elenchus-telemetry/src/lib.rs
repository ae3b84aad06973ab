//! Logging for Elenchus.
//!
//! - [`init_logging`] installs a `tracing-subscriber` registry (JSON or
//!   pretty, filtered by `EnvFilter`) that writes through the test harness
//!   so output is captured per test.
//! - [`TracingLogger`] implements the core [`Logger`](elenchus_core::Logger)
//!   so logged failures and passed checks become `tracing` events.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use elenchus_core::{DefaultAssertionHandler, PanicReporter};
//! use elenchus_telemetry::{init_logging, LogConfig, TracingLogger};
//!
//! init_logging(&LogConfig::default())?;
//!
//! let handler = DefaultAssertionHandler::new(Rc::new(PanicReporter))
//!     .with_logger(Rc::new(TracingLogger::new()));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logger;
pub mod logging;

pub use error::TelemetryError;
pub use logger::TracingLogger;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
