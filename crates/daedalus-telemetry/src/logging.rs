//! Structured logging setup.
//!
//! Produces a `tracing-subscriber` registry with one fmt layer, JSON or
//! pretty, filtered by an [`EnvFilter`] built from the configured level.

use serde::{Deserialize, Serialize};
use tracing::Dispatch;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Whether logging is enabled. Disabled logging yields a no-op dispatcher.
    pub enabled: bool,

    /// Filter directive (e.g. `"info"`, `"daedalus=debug,warn"`).
    pub level: String,

    /// JSON output when true, human-readable otherwise.
    pub json_format: bool,

    /// Emit span open/close events.
    pub span_events: bool,

    /// Include file and line.
    pub file_line_info: bool,

    /// Include thread ids.
    pub thread_ids: bool,

    /// Include the event target (module path).
    pub include_target: bool,

    /// ANSI colors in human-readable output.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Human-readable debug output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ansi: true,
            ..Self::default()
        }
    }

    /// JSON output at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

/// Builds a dispatcher writing to stdout.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidLevel`] for a bad filter directive.
pub fn build_dispatch(config: &LogConfig) -> TelemetryResult<Dispatch> {
    dispatch_with_writer(config, std::io::stdout)
}

/// Builds a dispatcher writing to `writer`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidLevel`] for a bad filter directive.
pub fn dispatch_with_writer<W>(config: &LogConfig, writer: W) -> TelemetryResult<Dispatch>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if !config.enabled {
        return Ok(Dispatch::none());
    }

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TelemetryError::InvalidLevel(format!("{}: {e}", config.level)))?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_ansi(config.ansi)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter)
            .boxed()
    };

    Ok(Dispatch::new(tracing_subscriber::registry().with(layer)))
}

/// Installs the configured dispatcher as the global default.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidLevel`] for a bad filter directive and
/// [`TelemetryError::LoggingInit`] if a global subscriber already exists.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }
    let dispatch = build_dispatch(config)?;
    tracing::dispatcher::set_global_default(dispatch)
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
