//! Assertion wrapper error types.

use thiserror::Error;

/// Errors raised while preparing something to assert on.
///
/// Failed checks are never returned as errors: they are recorded on the
/// chain and reported through its handler.
#[derive(Error, Debug)]
pub enum ExpectError {
    /// Response body could not be read.
    #[error("body read error: {0}")]
    BodyRead(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ExpectError::BodyRead("connection reset".to_string());
        assert_eq!(err.to_string(), "body read error: connection reset");
    }
}
