//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use elenchus_core::{FormatterOptions, ReportFormat, Severity};
use serde::{Deserialize, Serialize};

/// Assertion behaviour section.
///
/// # Example
///
/// ```
/// use elenchus_config::AssertionsConfig;
/// use elenchus_core::Severity;
///
/// let config = AssertionsConfig::default();
/// assert_eq!(config.default_severity, Severity::Error);
/// assert!(config.test_name.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AssertionsConfig {
    /// Severity of failures recorded on a fresh root chain.
    #[serde(default)]
    pub default_severity: Severity,

    /// Test name attached to every report.
    #[serde(default)]
    pub test_name: Option<String>,
}

/// Failure report section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReportingConfig {
    /// Report format (`text` or `json`).
    #[serde(default)]
    pub format: ReportFormat,

    /// Include the assertion path in reports.
    #[serde(default = "default_true")]
    pub print_paths: bool,

    /// Print aliased paths instead of full paths.
    #[serde(default = "default_true")]
    pub use_aliases: bool,

    /// Include the request in failure reports.
    #[serde(default)]
    pub print_request: bool,

    /// Include the response in failure reports.
    #[serde(default)]
    pub print_response: bool,

    /// Log passed checks through the logger.
    #[serde(default)]
    pub log_success: bool,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            print_paths: true,
            use_aliases: true,
            print_request: false,
            print_response: false,
            log_success: false,
        }
    }
}

impl ReportingConfig {
    /// Returns the formatter options for this section.
    ///
    /// # Example
    ///
    /// ```
    /// use elenchus_config::ReportingConfig;
    /// use elenchus_core::ReportFormat;
    ///
    /// let options = ReportingConfig {
    ///     format: ReportFormat::Json,
    ///     ..Default::default()
    /// }
    /// .formatter_options();
    ///
    /// assert_eq!(options.format, ReportFormat::Json);
    /// assert!(options.print_paths);
    /// ```
    #[must_use]
    pub fn formatter_options(&self) -> FormatterOptions {
        FormatterOptions {
            format: self.format,
            print_paths: self.print_paths,
            use_aliases: self.use_aliases,
            print_request: self.print_request,
            print_response: self.print_response,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON structured logs.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install a `tracing` subscriber and route logged failures through it.
    #[serde(default)]
    pub enabled: bool,

    /// Log level filter (e.g. "info", "elenchus_core=trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporting_defaults_match_formatter_defaults() {
        assert_eq!(
            ReportingConfig::default().formatter_options(),
            FormatterOptions::default()
        );
    }

    #[test]
    fn test_sections_deserialize_partially() {
        let reporting: ReportingConfig = toml::from_str("print_response = true").unwrap();
        assert!(reporting.print_response);
        assert!(reporting.print_paths);

        let logging: LoggingConfig = toml::from_str(r#"format = "json""#).unwrap();
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.level, "info");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<AssertionsConfig, _> = toml::from_str("severity = \"log\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_severity_names() {
        let assertions: AssertionsConfig =
            toml::from_str("default_severity = \"log\"\ntest_name = \"login\"").unwrap();
        assert_eq!(assertions.default_severity, Severity::Log);
        assert_eq!(assertions.test_name.as_deref(), Some("login"));
    }
}
