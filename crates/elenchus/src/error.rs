//! Setup errors.

use thiserror::Error;

/// Errors raised while building an [`Expect`](crate::Expect).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] elenchus_config::ConfigError),

    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] elenchus_telemetry::TelemetryError),
}

/// Result type for setup operations.
pub type Result<T> = std::result::Result<T, Error>;
