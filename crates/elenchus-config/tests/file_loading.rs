use std::io::Write;

use elenchus_config::{ConfigError, ConfigLoader, LogFormat};
use elenchus_core::{ReportFormat, Severity};
use tempfile::{Builder, NamedTempFile};

fn config_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = config_file(
        ".toml",
        r#"
            [assertions]
            test_name = "orders"

            [reporting]
            format = "json"
            print_response = true
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.assertions.test_name.as_deref(), Some("orders"));
    assert_eq!(config.reporting.format, ReportFormat::Json);
    assert!(config.reporting.print_response);
    assert!(!config.logging.enabled);
}

#[test]
fn test_json_file() {
    let file = config_file(
        ".json",
        r#"{"logging": {"enabled": true, "level": "debug", "format": "json"}}"#,
    );

    let config = ConfigLoader::new().with_optional_file(file.path()).unwrap().load().unwrap();

    assert!(config.logging.enabled);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_unsupported_extension() {
    let file = config_file(".yaml", "reporting: {}");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_malformed_file() {
    let file = config_file(".toml", "[reporting\nformat = ");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_dotenv_file_feeds_env_overrides() {
    let file = config_file(
        ".env",
        "ELENCHUS_DOTENV_TEST__ASSERTIONS__DEFAULT_SEVERITY=log\nELENCHUS_DOTENV_TEST__REPORTING__LOG_SUCCESS=true\n",
    );

    let config = ConfigLoader::new()
        .with_dotenv_file(file.path())
        .unwrap()
        .with_env_prefix("ELENCHUS_DOTENV_TEST")
        .load()
        .unwrap();

    assert_eq!(config.assertions.default_severity, Severity::Log);
    assert!(config.reporting.log_success);
}

#[test]
fn test_missing_dotenv_file() {
    let result = ConfigLoader::new().with_dotenv_file("/nonexistent/.env");
    assert!(matches!(result, Err(ConfigError::Dotenv(_))));
}
