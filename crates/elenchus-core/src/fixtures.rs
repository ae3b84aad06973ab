//! Test fixtures for Elenchus development and testing.
//!
//! [`RecordingHandler`] stores every outcome a chain reports so tests can
//! inspect paths and failure records without formatting or panicking.
//!
//! # Example
//!
//! ```
//! use elenchus_core::fixtures::recording_chain;
//!
//! let (root, handler) = recording_chain();
//! let op = root.enter("Value()");
//! op.leave();
//!
//! assert_eq!(handler.success_paths(), vec!["Value()".to_string()]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::chain::{Chain, ChainConfig};
use crate::context::AssertionContext;
use crate::failure::AssertionFailure;
use crate::handler::AssertionHandler;

/// One reported outcome.
#[derive(Debug, Clone)]
pub enum Recorded {
    /// A check passed.
    Success(AssertionContext),
    /// A check failed.
    Failure(AssertionContext, AssertionFailure),
}

/// An [`AssertionHandler`] that records everything it receives.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: RefCell<Vec<Recorded>>,
}

impl RecordingHandler {
    /// Creates an empty handler.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Returns all outcomes in report order.
    #[must_use]
    pub fn events(&self) -> Vec<Recorded> {
        self.events.borrow().clone()
    }

    /// Returns reported failures in order.
    #[must_use]
    pub fn failures(&self) -> Vec<(AssertionContext, AssertionFailure)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Recorded::Failure(ctx, failure) => Some((ctx.clone(), failure.clone())),
                Recorded::Success(_) => None,
            })
            .collect()
    }

    /// Returns the number of reported failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().len()
    }

    /// Returns the rendered paths of reported failures.
    #[must_use]
    pub fn failure_paths(&self) -> Vec<String> {
        self.failures()
            .iter()
            .map(|(ctx, _)| ctx.path_string())
            .collect()
    }

    /// Returns the rendered paths of passed checks.
    #[must_use]
    pub fn success_paths(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Recorded::Success(ctx) => Some(ctx.path_string()),
                Recorded::Failure(..) => None,
            })
            .collect()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl AssertionHandler for RecordingHandler {
    fn success(&self, ctx: &AssertionContext) {
        self.events.borrow_mut().push(Recorded::Success(ctx.clone()));
    }

    fn failure(&self, ctx: &AssertionContext, failure: &AssertionFailure) {
        self.events
            .borrow_mut()
            .push(Recorded::Failure(ctx.clone(), failure.clone()));
    }
}

/// Creates a root chain reporting to a fresh [`RecordingHandler`].
#[must_use]
pub fn recording_chain() -> (Chain, Rc<RecordingHandler>) {
    let handler = RecordingHandler::new();
    let chain = Chain::new(ChainConfig::new(handler.clone()));
    (chain, handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_chain_records_in_order() {
        let (root, handler) = recording_chain();

        let first = root.enter("First");
        first.fail(AssertionFailure::usage("first failed"));
        first.leave();

        let second = root.enter("Second");
        second.leave();

        let events = handler.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Recorded::Failure(..)));
        assert!(matches!(events[1], Recorded::Success(_)));

        handler.clear();
        assert!(handler.events().is_empty());
    }
}
