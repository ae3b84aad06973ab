//! Usage errors.
//!
//! A [`UsageError`] describes a broken API contract in the caller's test code,
//! such as leaving a chain twice or mutating a chain after it was left. These
//! are not assertion failures: they never reach the reporting sink. The chain
//! panics with the error as the panic message.

use thiserror::Error;

/// A violation of the chain API contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// An operation was invoked on a chain that already left.
    #[error("unexpected {operation}() on chain '{path}' after leave()")]
    ChainClosed {
        /// The rejected operation.
        operation: &'static str,
        /// Rendered path of the chain.
        path: String,
    },

    /// `leave()` was called on a chain that was not created by `enter()`.
    #[error("unexpected leave() on chain '{path}' that was not entered")]
    NotEntered {
        /// Rendered path of the chain.
        path: String,
    },

    /// `leave()` was called while the chain still has open children.
    #[error("unexpected leave() on chain '{path}' with {open} open children")]
    OpenChildren {
        /// Rendered path of the chain.
        path: String,
        /// Number of children that were entered but not left.
        open: usize,
    },

    /// `leave()` was called on a chain that is not the innermost open child
    /// of its parent.
    #[error("unpaired enter()/leave() on chain '{path}'")]
    OutOfOrder {
        /// Rendered path of the chain.
        path: String,
    },

    /// `enter()` with an empty segment on a chain with an empty path.
    #[error("unexpected empty path segment on chain with empty path")]
    EmptySegment,

    /// `replace()` on a chain with nothing to replace.
    #[error("unexpected replace() on chain with empty path")]
    EmptyPath,

    /// A single-assignment reference was attached twice.
    #[error("{what} is already attached to chain '{path}'")]
    AlreadyAttached {
        /// Which reference (environment, request or response).
        what: &'static str,
        /// Rendered path of the chain.
        path: String,
    },

    /// A fail callback was installed twice on the same chain.
    #[error("fail callback is already set on chain '{path}'")]
    CallbackAlreadySet {
        /// Rendered path of the chain.
        path: String,
    },

    /// An assertion failure record is malformed.
    #[error("invalid assertion failure: {0}")]
    InvalidFailure(String),
}

impl UsageError {
    /// Creates an invalid failure error.
    pub fn invalid_failure(message: impl Into<String>) -> Self {
        Self::InvalidFailure(message.into())
    }
}

/// Aborts the current test with a usage error.
#[track_caller]
pub(crate) fn fatal(err: UsageError) -> ! {
    panic!("{err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_closed_display() {
        let err = UsageError::ChainClosed {
            operation: "enter",
            path: "Value().IsEqual()".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected enter() on chain 'Value().IsEqual()' after leave()"
        );
    }

    #[test]
    fn test_already_attached_display() {
        let err = UsageError::AlreadyAttached {
            what: "response",
            path: "Response()".to_string(),
        };
        assert!(err.to_string().contains("response"));
        assert!(err.to_string().contains("Response()"));
    }

    #[test]
    #[should_panic(expected = "invalid assertion failure: no errors")]
    fn test_fatal_panics_with_message() {
        fatal(UsageError::invalid_failure("no errors"));
    }
}
