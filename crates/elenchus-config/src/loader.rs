//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use elenchus_core::{ReportFormat, Severity};

use crate::{ConfigError, ElenchusConfig, LogFormat};

/// Environment prefix used when none is given.
pub const DEFAULT_ENV_PREFIX: &str = "ELENCHUS";

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code) or a preset
/// 2. Configuration file or string (TOML or JSON)
/// 3. Environment variables (`PREFIX__SECTION__KEY`)
///
/// # Example
///
/// ```no_run
/// use elenchus_config::ConfigLoader;
///
/// # fn main() -> Result<(), elenchus_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("elenchus.toml")?
///     .with_env_prefix("ELENCHUS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: ElenchusConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ElenchusConfig::default(),
            env_prefix: None,
        }
    }

    /// Start from the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use elenchus_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert!(config.reporting.log_success);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ElenchusConfig::development();
        self
    }

    /// Start from the CI preset.
    #[must_use]
    pub fn with_ci(mut self) -> Self {
        self.config = ElenchusConfig::ci();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`. Sections missing
    /// from the file take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        self.config = match extension.as_deref() {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `format` (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use elenchus_config::ConfigLoader;
    /// use elenchus_core::ReportFormat;
    ///
    /// let toml = r#"
    ///     [reporting]
    ///     format = "json"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.reporting.format, ReportFormat::Json);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::UnsupportedFormat(format.to_string())),
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `ELENCHUS__REPORTING__PRINT_RESPONSE=true`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from a `.env` file in the current directory, if any.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if a `.env` file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::Dotenv(e.to_string())),
        }
    }

    /// Load variables from the given `.env` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref()).map_err(|e| ConfigError::Dotenv(e.to_string()))?;
        Ok(self)
    }

    /// Apply overrides from explicit `(key, value)` pairs.
    ///
    /// Keys use the same `PREFIX__SECTION__KEY` format as environment
    /// variables; pairs without the prefix are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EnvParseError` if a value cannot be parsed.
    ///
    /// # Example
    ///
    /// ```
    /// use elenchus_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_overrides("ELENCHUS", [("ELENCHUS__ASSERTIONS__TEST_NAME", "login")])
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.assertions.test_name.as_deref(), Some("login"));
    /// ```
    pub fn with_overrides<I, K, V>(mut self, prefix: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let prefix = prefix.to_uppercase();
        let scoped = format!("{prefix}__");
        for (key, value) in vars {
            let key = key.as_ref();
            if key.starts_with(&scoped) {
                self.apply_env_var(key, value.as_ref(), &prefix)?;
            }
        }
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(mut self) -> Result<ElenchusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars().collect();
            self = self.with_overrides(&prefix, vars)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without validation or environment overrides.
    #[must_use]
    pub fn load_unvalidated(self) -> ElenchusConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let flag = || {
            parse_bool(value)
                .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
        };

        match parts.as_slice() {
            ["ASSERTIONS", "DEFAULT_SEVERITY"] => {
                self.config.assertions.default_severity = match value.to_lowercase().as_str() {
                    "error" => Severity::Error,
                    "log" => Severity::Log,
                    "info" => Severity::Info,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'error', 'log', or 'info'",
                        ))
                    }
                };
            }
            ["ASSERTIONS", "TEST_NAME"] => {
                self.config.assertions.test_name = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            ["REPORTING", "FORMAT"] => {
                self.config.reporting.format = match value.to_lowercase().as_str() {
                    "text" => ReportFormat::Text,
                    "json" => ReportFormat::Json,
                    _ => return Err(ConfigError::env_parse_error(key, "expected 'text' or 'json'")),
                };
            }
            ["REPORTING", "PRINT_PATHS"] => self.config.reporting.print_paths = flag()?,
            ["REPORTING", "USE_ALIASES"] => self.config.reporting.use_aliases = flag()?,
            ["REPORTING", "PRINT_REQUEST"] => self.config.reporting.print_request = flag()?,
            ["REPORTING", "PRINT_RESPONSE"] => self.config.reporting.print_response = flag()?,
            ["REPORTING", "LOG_SUCCESS"] => self.config.reporting.log_success = flag()?,

            ["LOGGING", "ENABLED"] => self.config.logging.enabled = flag()?,
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            // Unknown keys are left for other tools sharing the prefix.
            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
