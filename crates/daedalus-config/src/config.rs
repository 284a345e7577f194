//! Configuration types.

use daedalus_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaedalusConfig {
    /// Which contract validators run, and how they report.
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Logging sink configuration.
    #[serde(default)]
    pub logging: LogConfig,
}

impl DaedalusConfig {
    /// Debug logging, response validation on.
    #[must_use]
    pub fn development() -> Self {
        Self {
            validation: ValidationSettings {
                responses: true,
                ..ValidationSettings::default()
            },
            logging: LogConfig::development(),
        }
    }

    /// JSON logging, response validation off.
    #[must_use]
    pub fn production() -> Self {
        Self {
            validation: ValidationSettings::default(),
            logging: LogConfig::production(),
        }
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        if self.validation.continue_on_query_error && !self.validation.query {
            return Err(ConfigError::invalid_value(
                "validation.continue_on_query_error",
                "requires validation.query = true",
            ));
        }

        Ok(())
    }
}

/// Validator switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationSettings {
    /// Convert declared path parameters into typed values.
    pub path_params: bool,

    /// Validate the query string against declared query parameters.
    pub query: bool,

    /// Validate JSON request bodies against the body schema.
    pub body: bool,

    /// Validate JSON response bodies against the declared response schema.
    pub responses: bool,

    /// Forward the request downstream even when query validation fails.
    pub continue_on_query_error: bool,

    /// Hand undecodable response bodies to the error handler.
    pub report_response_decode_errors: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            path_params: true,
            query: true,
            body: true,
            responses: false,
            continue_on_query_error: false,
            report_response_decode_errors: true,
        }
    }
}

impl ValidationSettings {
    /// Every validator disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            path_params: false,
            query: false,
            body: false,
            responses: false,
            continue_on_query_error: false,
            report_response_decode_errors: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaedalusConfig::default();
        assert!(config.validation.path_params);
        assert!(config.validation.query);
        assert!(config.validation.body);
        assert!(!config.validation.responses);
        assert!(config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_config() {
        let config = DaedalusConfig::development();
        assert!(config.validation.responses);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json_format);
    }

    #[test]
    fn test_empty_level_rejected() {
        let mut config = DaedalusConfig::default();
        config.logging.level = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_empty_level_allowed_when_logging_disabled() {
        let mut config = DaedalusConfig::default();
        config.logging.enabled = false;
        config.logging.level = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_continue_on_error_requires_query() {
        let config = DaedalusConfig {
            validation: ValidationSettings {
                query: false,
                continue_on_query_error: true,
                ..ValidationSettings::default()
            },
            ..DaedalusConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<DaedalusConfig, _> = toml::from_str("[server]\nport = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_validation_key_rejected() {
        let result: Result<DaedalusConfig, _> = toml::from_str("[validation]\nheaders = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: DaedalusConfig = toml::from_str("[validation]\nresponses = true\n").unwrap();
        assert!(config.validation.responses);
        assert!(config.validation.query);
        assert_eq!(config.logging, LogConfig::default());
    }

    #[test]
    fn test_disabled_settings() {
        let settings = ValidationSettings::disabled();
        assert!(!settings.path_params && !settings.query && !settings.body && !settings.responses);
    }
}
