//! Main configuration types.
//!
//! This module provides the top-level [`ElenchusConfig`] struct and its builder.

use elenchus_core::{ReportFormat, Severity};
use serde::{Deserialize, Serialize};

use crate::{AssertionsConfig, ConfigError, LogFormat, LoggingConfig, ReportingConfig};

/// Complete Elenchus configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use elenchus_config::ElenchusConfig;
///
/// let config = ElenchusConfig::default();
/// assert!(config.reporting.print_paths);
/// assert!(!config.logging.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ElenchusConfig {
    /// Assertion behaviour.
    #[serde(default)]
    pub assertions: AssertionsConfig,

    /// Failure reports.
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ElenchusConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use elenchus_config::{ElenchusConfig, ReportingConfig};
    ///
    /// let config = ElenchusConfig::builder()
    ///     .test_name("create user")
    ///     .reporting(ReportingConfig {
    ///         print_response: true,
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.assertions.test_name.as_deref(), Some("create user"));
    /// assert!(config.reporting.print_response);
    /// ```
    #[must_use]
    pub fn builder() -> ElenchusConfigBuilder {
        ElenchusConfigBuilder::new()
    }

    /// Verbose local preset: full reports, successes logged, debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            assertions: AssertionsConfig::default(),
            reporting: ReportingConfig {
                print_request: true,
                print_response: true,
                log_success: true,
                ..ReportingConfig::default()
            },
            logging: LoggingConfig {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }

    /// Machine-readable preset for CI runs: JSON reports and JSON logs.
    #[must_use]
    pub fn ci() -> Self {
        Self {
            assertions: AssertionsConfig::default(),
            reporting: ReportingConfig {
                format: ReportFormat::Json,
                print_response: true,
                ..ReportingConfig::default()
            },
            logging: LoggingConfig {
                enabled: true,
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The test name is set but empty
    /// - Logging is enabled with an empty level
    /// - Aliases are requested while paths are not printed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .assertions
            .test_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(ConfigError::invalid_value(
                "assertions.test_name",
                "must not be empty when set",
            ));
        }

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        if self.reporting.use_aliases && !self.reporting.print_paths {
            return Err(ConfigError::invalid_value(
                "reporting.use_aliases",
                "requires reporting.print_paths",
            ));
        }

        Ok(())
    }
}

/// Builder for [`ElenchusConfig`].
#[derive(Debug, Default)]
pub struct ElenchusConfigBuilder {
    config: ElenchusConfig,
}

impl ElenchusConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the assertions section.
    #[must_use]
    pub fn assertions(mut self, assertions: AssertionsConfig) -> Self {
        self.config.assertions = assertions;
        self
    }

    /// Set the reporting section.
    #[must_use]
    pub fn reporting(mut self, reporting: ReportingConfig) -> Self {
        self.config.reporting = reporting;
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Set the test name.
    #[must_use]
    pub fn test_name(mut self, name: impl Into<String>) -> Self {
        self.config.assertions.test_name = Some(name.into());
        self
    }

    /// Set the default severity.
    #[must_use]
    pub fn default_severity(mut self, severity: Severity) -> Self {
        self.config.assertions.default_severity = severity;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ElenchusConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ElenchusConfig::default().validate().is_ok());
        assert!(ElenchusConfig::development().validate().is_ok());
        assert!(ElenchusConfig::ci().validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = ElenchusConfig::development();
        assert!(dev.reporting.log_success);
        assert_eq!(dev.logging.level, "debug");

        let ci = ElenchusConfig::ci();
        assert_eq!(ci.reporting.format, ReportFormat::Json);
        assert_eq!(ci.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_empty_test_name() {
        let config = ElenchusConfig::builder().test_name("  ").build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("assertions.test_name"));
    }

    #[test]
    fn test_validate_empty_level() {
        let config = ElenchusConfig::builder()
            .logging(LoggingConfig {
                enabled: true,
                level: String::new(),
                format: LogFormat::Json,
            })
            .build();
        assert!(config.validate().is_err());

        let disabled = ElenchusConfig::builder()
            .logging(LoggingConfig {
                enabled: false,
                level: String::new(),
                format: LogFormat::Json,
            })
            .build();
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_validate_aliases_without_paths() {
        let config = ElenchusConfig::builder()
            .reporting(ReportingConfig {
                print_paths: false,
                ..Default::default()
            })
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_severity() {
        let config = ElenchusConfig::builder()
            .default_severity(Severity::Log)
            .build();
        assert_eq!(config.assertions.default_severity, Severity::Log);
    }
}
