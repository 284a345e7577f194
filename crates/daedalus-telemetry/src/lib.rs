//! Logging for Daedalus.
//!
//! Daedalus never installs a global subscriber on its own. Logging is an
//! injected capability: [`build_dispatch`] turns a [`LogConfig`] into a
//! [`tracing::Dispatch`] that can be handed to the router, and
//! [`init_logging`] installs the same thing process-wide for applications
//! that want it.
//!
//! ```rust,ignore
//! use daedalus_telemetry::{build_dispatch, LogConfig};
//!
//! let logger = build_dispatch(&LogConfig::development())?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod capture;
mod error;
pub mod logging;

pub use capture::LogCapture;
pub use error::TelemetryError;
pub use logging::{build_dispatch, dispatch_with_writer, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
