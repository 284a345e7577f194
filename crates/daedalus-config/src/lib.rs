//! Typed configuration for Daedalus.
//!
//! Configuration is layered: built-in defaults, then an optional TOML or
//! JSON document, then environment overrides. Unknown keys are rejected at
//! every level.
//!
//! # Example
//!
//! ```no_run
//! use daedalus_config::ConfigLoader;
//!
//! # fn main() -> Result<(), daedalus_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("daedalus.toml")?
//!     .with_env_prefix("DAEDALUS")
//!     .load()?;
//!
//! assert!(config.validation.query);
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [validation]
//! path_params = true
//! query = true
//! body = true
//! responses = false
//! continue_on_query_error = false
//! report_response_decode_errors = true
//!
//! [logging]
//! level = "info"
//! json_format = true
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{DaedalusConfig, ValidationSettings};
pub use daedalus_telemetry::LogConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
