//! Reporting sink.
//!
//! Chains hand finished checks to an [`AssertionHandler`]. The
//! [`DefaultAssertionHandler`] formats them and routes error-level failures
//! to a [`Reporter`] (which fails the test) and everything else to a
//! [`Logger`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::AssertionContext;
use crate::failure::AssertionFailure;
use crate::format::{DefaultFormatter, Formatter};

/// Receives error-level failure messages.
pub trait Reporter {
    /// Reports a failed check.
    fn report(&self, message: &str);
}

impl<F: Fn(&str)> Reporter for F {
    fn report(&self, message: &str) {
        self(message);
    }
}

/// Receives informational messages.
pub trait Logger {
    /// Logs a message.
    fn log(&self, message: &str);
}

/// Receives the outcome of every finished check.
pub trait AssertionHandler {
    /// Called when a check passed.
    fn success(&self, ctx: &AssertionContext);

    /// Called when a check failed.
    fn failure(&self, ctx: &AssertionContext, failure: &AssertionFailure);
}

/// Fails the running test by panicking with the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl Reporter for PanicReporter {
    fn report(&self, message: &str) {
        panic!("{message}");
    }
}

/// Stores reports for later inspection.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    messages: Rc<RefCell<Vec<String>>>,
}

impl CollectingReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected messages.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Returns the number of collected messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    /// Returns `true` if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

impl Logger for CollectingReporter {
    fn log(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// The built-in [`AssertionHandler`].
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use elenchus_core::{CollectingReporter, DefaultAssertionHandler};
///
/// let reporter = CollectingReporter::new();
/// let handler = DefaultAssertionHandler::new(Rc::new(reporter.clone()));
/// # let _ = handler;
/// ```
pub struct DefaultAssertionHandler {
    formatter: Box<dyn Formatter>,
    reporter: Rc<dyn Reporter>,
    logger: Option<Rc<dyn Logger>>,
    log_success: bool,
}

impl DefaultAssertionHandler {
    /// Creates a handler with the default formatter and no logger.
    #[must_use]
    pub fn new(reporter: Rc<dyn Reporter>) -> Self {
        Self {
            formatter: Box::new(DefaultFormatter::default()),
            reporter,
            logger: None,
            log_success: false,
        }
    }

    /// Replaces the formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Attaches a logger for non-error failures and successes.
    #[must_use]
    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enables logging of passed checks.
    #[must_use]
    pub fn with_log_success(mut self, enabled: bool) -> Self {
        self.log_success = enabled;
        self
    }
}

impl std::fmt::Debug for DefaultAssertionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAssertionHandler")
            .field("has_logger", &self.logger.is_some())
            .field("log_success", &self.log_success)
            .finish_non_exhaustive()
    }
}

impl AssertionHandler for DefaultAssertionHandler {
    fn success(&self, ctx: &AssertionContext) {
        tracing::trace!(path = %ctx.path_string(), "assertion passed");

        if self.log_success {
            if let Some(logger) = &self.logger {
                logger.log(&self.formatter.format_success(ctx));
            }
        }
    }

    fn failure(&self, ctx: &AssertionContext, failure: &AssertionFailure) {
        let severity = failure.effective_severity();
        let message = self.formatter.format_failure(ctx, failure);

        if severity.is_error() {
            tracing::debug!(path = %ctx.path_string(), kind = ?failure.kind, "assertion failed");
            self.reporter.report(&message);
            return;
        }

        match &self.logger {
            Some(logger) => logger.log(&message),
            None => tracing::info!(
                path = %ctx.path_string(),
                severity = %severity,
                "{message}"
            ),
        }
    }
}
