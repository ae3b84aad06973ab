//! A [`Logger`] that emits `tracing` events.

use elenchus_core::Logger;
use tracing::Level;

/// Target of every event emitted by [`TracingLogger`].
pub const TARGET: &str = "elenchus";

/// Routes logged assertion messages to the current `tracing` subscriber.
///
/// Used by the default handler for non-error failures (probes inside
/// `filter`/`find`, or chains set to `Severity::Log`) and, when enabled,
/// for passed checks.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use elenchus_core::{CollectingReporter, DefaultAssertionHandler};
/// use elenchus_telemetry::TracingLogger;
///
/// let handler = DefaultAssertionHandler::new(Rc::new(CollectingReporter::new()))
///     .with_logger(Rc::new(TracingLogger::new().with_test_name("login")));
/// # let _ = handler;
/// ```
#[derive(Debug, Clone)]
pub struct TracingLogger {
    level: Level,
    test_name: Option<String>,
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingLogger {
    /// Creates a logger emitting at `INFO`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: Level::INFO,
            test_name: None,
        }
    }

    /// Sets the event level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a `test_name` field to every event.
    #[must_use]
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = Some(name.into());
        self
    }

    /// Returns the event level.
    pub const fn level(&self) -> Level {
        self.level
    }
}

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        let test_name = self.test_name.as_deref().unwrap_or_default();
        match self.level {
            Level::ERROR => tracing::error!(target: TARGET, test_name, "{message}"),
            Level::WARN => tracing::warn!(target: TARGET, test_name, "{message}"),
            Level::INFO => tracing::info!(target: TARGET, test_name, "{message}"),
            Level::DEBUG => tracing::debug!(target: TARGET, test_name, "{message}"),
            Level::TRACE => tracing::trace!(target: TARGET, test_name, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(max_level: Level, f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max_level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        out.text()
    }

    #[test]
    fn test_logs_message_with_fields() {
        let logger = TracingLogger::new().with_test_name("orders");
        let output = capture(Level::INFO, || logger.log("Array().Filter()[1] failed"));

        assert!(output.contains("Array().Filter()[1] failed"));
        assert!(output.contains("test_name=\"orders\""));
        assert!(output.contains(TARGET));
        assert!(output.contains("INFO"));
    }

    #[test]
    fn test_level_is_respected() {
        let logger = TracingLogger::new().with_level(Level::DEBUG);
        assert_eq!(logger.level(), Level::DEBUG);

        assert!(capture(Level::INFO, || logger.log("hidden")).is_empty());
        assert!(capture(Level::DEBUG, || logger.log("shown")).contains("shown"));
    }
}
