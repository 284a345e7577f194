//! Route table errors.

use thiserror::Error;

/// Reasons a path pattern cannot be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A `*name` segment was followed by more segments.
    #[error("wildcard segment '{segment}' must be the last segment of '{pattern}'")]
    WildcardNotLast {
        /// Offending segment
        segment: String,
        /// Full pattern
        pattern: String,
    },

    /// A `{}` or `*` segment has no name.
    #[error("unnamed parameter in pattern '{pattern}'")]
    UnnamedParameter {
        /// Full pattern
        pattern: String,
    },

    /// The method is already registered for an equivalent pattern.
    #[error("{method} {pattern} is already registered")]
    DuplicateRoute {
        /// Request method
        method: http::Method,
        /// Full pattern
        pattern: String,
    },
}
