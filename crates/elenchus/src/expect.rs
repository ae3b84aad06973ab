//! The test entry point.

use std::rc::Rc;

use elenchus_assert::{Array, Boolean, ExpectError, Number, Object, Response, StringValue, Value};
use elenchus_config::{ConfigLoader, ElenchusConfig, LogFormat, DEFAULT_ENV_PREFIX};
use elenchus_core::{
    Chain, ChainConfig, DefaultAssertionHandler, DefaultFormatter, Environment, PanicReporter,
    Reporter, RequestSnapshot, ResponseSnapshot,
};
use elenchus_telemetry::{init_logging, LogConfig, TelemetryError, TracingLogger};
use serde::Serialize;

use crate::Result;

/// Name of the optional configuration file read by [`Expect::load`].
pub const CONFIG_FILE: &str = "elenchus.toml";

/// Creates wrappers that share one root chain and environment.
///
/// Create one per test. Failures panic through [`PanicReporter`] unless a
/// different reporter is given.
///
/// # Example
///
/// ```
/// use elenchus::Expect;
/// use serde_json::json;
///
/// let e = Expect::new();
/// let user = e.object(&json!({"id": 1, "roles": ["admin"]}));
///
/// user.value("id").number().is_equal(&1);
/// user.value("roles").array().contains_all(&["admin"]);
/// ```
#[derive(Debug, Clone)]
pub struct Expect {
    root: Chain,
    environment: Environment,
}

impl Default for Expect {
    fn default() -> Self {
        Self::new()
    }
}

impl Expect {
    /// Creates an instance with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&ElenchusConfig::default())
    }

    /// Creates an instance from `config`, failing tests by panicking.
    #[must_use]
    pub fn from_config(config: &ElenchusConfig) -> Self {
        Self::with_reporter(config, Rc::new(PanicReporter))
    }

    /// Creates an instance from `config` that reports failures to `reporter`.
    #[must_use]
    pub fn with_reporter(config: &ElenchusConfig, reporter: Rc<dyn Reporter>) -> Self {
        let mut logger = TracingLogger::new();
        if let Some(name) = &config.assertions.test_name {
            logger = logger.with_test_name(name.clone());
        }

        let handler = DefaultAssertionHandler::new(reporter)
            .with_formatter(DefaultFormatter::new(config.reporting.formatter_options()))
            .with_logger(Rc::new(logger))
            .with_log_success(config.reporting.log_success);

        let mut chain_config = ChainConfig::new(Rc::new(handler))
            .with_severity(config.assertions.default_severity)
            .with_environment(Environment::new());
        if let Some(name) = &config.assertions.test_name {
            chain_config = chain_config.with_test_name(name.clone());
        }

        Self::from_chain_config(chain_config)
    }

    /// Creates an instance over a fully custom root configuration.
    #[must_use]
    pub fn from_chain_config(config: ChainConfig) -> Self {
        let environment = config.environment.clone().unwrap_or_default();
        let config = if config.environment.is_some() {
            config
        } else {
            config.with_environment(environment.clone())
        };
        Self {
            root: Chain::new(config),
            environment,
        }
    }

    /// Loads configuration and sets up logging, then creates an instance.
    ///
    /// Layers, later overriding earlier: defaults, `.env`, `elenchus.toml`
    /// in the working directory if present, `ELENCHUS__*` variables. When
    /// `[logging] enabled = true` a global subscriber is installed unless
    /// one already is.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails to load or validate, or the
    /// log filter is invalid.
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::new()
            .with_dotenv()?
            .with_optional_file(CONFIG_FILE)?
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .load()?;

        setup_logging(&config)?;
        Ok(Self::from_config(&config))
    }

    /// Returns the root chain.
    pub const fn chain(&self) -> &Chain {
        &self.root
    }

    /// Returns the environment shared by every wrapper of this instance.
    pub const fn env(&self) -> &Environment {
        &self.environment
    }

    /// Wraps any serializable value.
    pub fn value<T: Serialize + ?Sized>(&self, value: &T) -> Value {
        Value::new(&self.root, value)
    }

    /// Wraps a map or struct.
    pub fn object<T: Serialize + ?Sized>(&self, value: &T) -> Object {
        Object::new(&self.root, value)
    }

    /// Wraps a sequence.
    pub fn array<T: Serialize + ?Sized>(&self, value: &T) -> Array {
        Array::new(&self.root, value)
    }

    /// Wraps a number.
    pub fn number<T: Serialize + ?Sized>(&self, value: &T) -> Number {
        Number::new(&self.root, value)
    }

    /// Wraps a string.
    pub fn string(&self, value: impl Into<String>) -> StringValue {
        StringValue::new(&self.root, value)
    }

    /// Wraps a boolean.
    pub fn boolean(&self, value: bool) -> Boolean {
        Boolean::new(&self.root, value)
    }

    /// Wraps a received response.
    pub fn response(&self, response: ResponseSnapshot) -> Response {
        Response::new(&self.root, response)
    }

    /// Wraps a received response together with the request that produced it.
    pub fn exchange(&self, request: RequestSnapshot, response: ResponseSnapshot) -> Response {
        Response::with_request(&self.root, request, response)
    }

    /// Reads the body of an `http::Response` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns `ExpectError::BodyRead` if the body cannot be collected.
    pub async fn http_response<B>(
        &self,
        response: http::Response<B>,
    ) -> std::result::Result<Response, ExpectError>
    where
        B: http_body_util::BodyExt,
        B::Error: std::fmt::Display,
    {
        Response::from_http(&self.root, response).await
    }
}

/// Installs the global subscriber described by `config.logging`.
///
/// An already installed subscriber is kept.
///
/// # Errors
///
/// Returns an error if the level filter is invalid.
pub fn setup_logging(config: &ElenchusConfig) -> Result<()> {
    let log_config = LogConfig {
        enabled: config.logging.enabled,
        level: config.logging.level.clone(),
        json_format: config.logging.format == LogFormat::Json,
        ..LogConfig::default()
    };

    match init_logging(&log_config) {
        Ok(()) => Ok(()),
        Err(TelemetryError::LoggingInit(reason)) => {
            tracing::debug!(%reason, "keeping existing subscriber");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elenchus_config::{LoggingConfig, ReportingConfig};
    use elenchus_core::{CollectingReporter, ReportFormat, Severity};
    use serde_json::json;

    fn collecting(config: &ElenchusConfig) -> (Expect, CollectingReporter) {
        let reporter = CollectingReporter::new();
        (Expect::with_reporter(config, Rc::new(reporter.clone())), reporter)
    }

    #[test]
    fn test_passing_checks_report_nothing() {
        let (e, reporter) = collecting(&ElenchusConfig::default());

        e.value(&json!({"a": [1, 2]})).path("/a/1").number().is_equal(&2);
        e.string("abc").has_prefix("a");
        e.boolean(true).is_true();

        assert!(reporter.is_empty());
        assert!(!e.chain().tree_failed());
    }

    #[test]
    fn test_failure_is_reported_with_test_name() {
        let config = ElenchusConfig::builder().test_name("users").build();
        let (e, reporter) = collecting(&config);

        e.number(&3).lt(&2);

        let messages = reporter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("assertion failed: Number().Lt()"));
        assert!(messages[0].contains("test: users"));
    }

    #[test]
    fn test_json_reports() {
        let config = ElenchusConfig::builder()
            .reporting(ReportingConfig {
                format: ReportFormat::Json,
                ..Default::default()
            })
            .build();
        let (e, reporter) = collecting(&config);

        e.array(&[1, 2]).length().is_equal(&3);

        let report: serde_json::Value = serde_json::from_str(&reporter.messages()[0]).unwrap();
        assert_eq!(report["outcome"], "failed");
        assert_eq!(report["path"], "Array().Length().IsEqual()");
    }

    #[test]
    fn test_log_severity_does_not_report() {
        let config = ElenchusConfig::builder()
            .default_severity(Severity::Log)
            .build();
        let (e, reporter) = collecting(&config);

        e.string("x").is_empty();

        assert!(reporter.is_empty());
        assert!(e.chain().tree_failed());
    }

    #[test]
    fn test_environment_is_shared() {
        let e = Expect::new();
        e.env().put("token", "abc");

        let attached = e.chain().environment().and_then(|env| env.get_string("token"));
        assert_eq!(attached.as_deref(), Some("abc"));
    }

    #[test]
    fn test_custom_chain_config_keeps_environment() {
        let environment = Environment::new();
        environment.put("id", 7);
        let reporter = CollectingReporter::new();
        let handler = DefaultAssertionHandler::new(Rc::new(reporter));
        let e = Expect::from_chain_config(
            ChainConfig::new(Rc::new(handler)).with_environment(environment),
        );

        assert_eq!(e.env().get_number("id"), Some(7.0));
    }

    #[test]
    fn test_setup_logging_disabled() {
        assert!(setup_logging(&ElenchusConfig::default()).is_ok());
    }

    #[test]
    fn test_setup_logging_invalid_filter() {
        let config = ElenchusConfig::builder()
            .logging(LoggingConfig {
                enabled: true,
                level: "elenchus=verbose".to_string(),
                format: LogFormat::Pretty,
            })
            .build();
        assert!(matches!(setup_logging(&config), Err(crate::Error::Telemetry(_))));
    }

    #[test]
    #[should_panic(expected = "assertion failed: Boolean().IsFalse()")]
    fn test_default_reporter_panics() {
        Expect::new().boolean(true).is_false();
    }
}
