//! Typed configuration for Elenchus.
//!
//! Controls how assertion failures are reported and whether they are logged:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults or preset → file → env)
//!
//! The configuration is plain data. It is read once and handed to
//! `elenchus::Expect::from_config`; nothing here is global.
//!
//! # Example
//!
//! ```no_run
//! use elenchus_config::ConfigLoader;
//!
//! # fn main() -> Result<(), elenchus_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("elenchus.toml")?
//!     .with_env_prefix("ELENCHUS")
//!     .load()?;
//!
//! println!("reports are printed as {:?}", config.reporting.format);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [assertions]
//! default_severity = "error"
//! test_name = "users api"
//!
//! [reporting]
//! format = "text"
//! print_paths = true
//! use_aliases = true
//! print_request = false
//! print_response = true
//! log_success = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "pretty"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every value can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `ELENCHUS__REPORTING__FORMAT=json`
//! - `ELENCHUS__ASSERTIONS__DEFAULT_SEVERITY=log`
//! - `ELENCHUS__LOGGING__ENABLED=true`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::*;
