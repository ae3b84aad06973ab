//! # Elenchus Core
//!
//! Chain tracking and value canonicalization for the Elenchus HTTP
//! assertion library.
//!
//! This crate provides the foundational types every assertion wrapper uses:
//!
//! - [`Chain`] - A node in the tree of nested assertion contexts
//! - [`AssertionFailure`] - Structured record of one failed check
//! - [`canonical`] - Normalization of typed values before comparison
//! - [`AssertionHandler`] - Where finished checks are reported
//! - [`Environment`] - Per-test key/value store
//! - [`UsageError`] - Broken API contracts, raised as panics

#![doc(html_root_url = "https://docs.rs/elenchus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod canonical;
mod chain;
mod context;
mod environment;
mod error;
mod failure;
pub mod fixtures;
mod format;
mod handler;

pub use chain::{Chain, ChainConfig};
pub use context::{render_path, AssertionContext, RequestSnapshot, ResponseSnapshot};
pub use environment::Environment;
pub use error::UsageError;
pub use failure::{AssertionFailure, Expected, FailureKind, Severity};
pub use format::{DefaultFormatter, Formatter, FormatterOptions, ReportFormat};
pub use handler::{
    AssertionHandler, CollectingReporter, DefaultAssertionHandler, Logger, PanicReporter, Reporter,
};
