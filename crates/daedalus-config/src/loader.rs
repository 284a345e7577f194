//! Layered configuration loader.
//!
//! Sources apply in call order: defaults, then files or strings, then
//! environment overrides when [`ConfigLoader::load`] runs. Each file replaces
//! the whole configuration; sections it omits fall back to their defaults.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, DaedalusConfig};

/// Builds a [`DaedalusConfig`] from defaults, documents and environment.
#[derive(Debug)]
pub struct ConfigLoader {
    config: DaedalusConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Start from [`DaedalusConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DaedalusConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to [`DaedalusConfig::development`].
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = DaedalusConfig::development();
        self
    }

    /// Reset to [`DaedalusConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = DaedalusConfig::production();
        self
    }

    /// Load a `.toml` or `.json` file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unknown extension, or fails to parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.config = parse(&content, format)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");

        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is not an error.
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

    /// Parse configuration from a string in the given format
    /// (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Enable environment overrides of the form `PREFIX__SECTION__KEY`,
    /// e.g. `DAEDALUS__VALIDATION__RESPONSES=true` or
    /// `DAEDALUS__LOGGING__LEVEL=debug`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or the final
    /// configuration is invalid.
    pub fn load(mut self) -> Result<DaedalusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_overrides(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    fn apply_overrides<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{prefix}__");
        for (key, value) in vars {
            if let Some(rest) = key.strip_prefix(&marker) {
                let parts: Vec<&str> = rest.split("__").collect();
                self.apply_var(&key, &parts, &value)?;
            }
        }
        Ok(())
    }

    fn apply_var(&mut self, key: &str, parts: &[&str], value: &str) -> Result<(), ConfigError> {
        let validation = &mut self.config.validation;
        let logging = &mut self.config.logging;

        let flag = match parts {
            ["VALIDATION", "PATH_PARAMS"] => &mut validation.path_params,
            ["VALIDATION", "QUERY"] => &mut validation.query,
            ["VALIDATION", "BODY"] => &mut validation.body,
            ["VALIDATION", "RESPONSES"] => &mut validation.responses,
            ["VALIDATION", "CONTINUE_ON_QUERY_ERROR"] => &mut validation.continue_on_query_error,
            ["VALIDATION", "REPORT_RESPONSE_DECODE_ERRORS"] => {
                &mut validation.report_response_decode_errors
            }
            ["LOGGING", "ENABLED"] => &mut logging.enabled,
            ["LOGGING", "JSON_FORMAT"] => &mut logging.json_format,
            ["LOGGING", "SPAN_EVENTS"] => &mut logging.span_events,
            ["LOGGING", "FILE_LINE_INFO"] => &mut logging.file_line_info,
            ["LOGGING", "THREAD_IDS"] => &mut logging.thread_ids,
            ["LOGGING", "INCLUDE_TARGET"] => &mut logging.include_target,
            ["LOGGING", "ANSI"] => &mut logging.ansi,
            ["LOGGING", "LEVEL"] => {
                logging.level = value.to_string();
                return Ok(());
            }
            _ => {
                tracing::debug!(var = key, "ignoring unknown configuration variable");
                return Ok(());
            }
        };

        *flag = parse_bool(value)
            .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<DaedalusConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
