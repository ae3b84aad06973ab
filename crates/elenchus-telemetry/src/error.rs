//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level filter could not be parsed.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// Failed to install the subscriber.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");

        let err = TelemetryError::InvalidFilter("bad=level=x".to_string());
        assert_eq!(err.to_string(), "Invalid log filter: bad=level=x");
    }
}
