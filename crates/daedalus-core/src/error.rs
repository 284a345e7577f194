//! Error types shared across the pipeline.
//!
//! - [`ConversionError`]: a raw string could not become a typed value
//! - [`ValidationError`]: a request or response violated the contract;
//!   these are collected and handed to the caller's error handler
//! - [`ContractError`]: the contract itself cannot be turned into routes

use http::Method;
use thiserror::Error;

use crate::contract::{ParamLocation, ParamType};
use crate::schema::SchemaViolation;

/// Failure converting a raw parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The declared type name is not a known parameter type.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The type is known but has no conversion.
    #[error("type {0}: not implemented")]
    UnsupportedType(ParamType),

    /// The format is not supported for the type.
    #[error("unknown format {format} for type {param_type}")]
    UnsupportedFormat {
        /// Declared type
        param_type: ParamType,
        /// Declared format
        format: String,
    },

    /// The value does not parse as the target type.
    #[error("cannot convert {value} to {target}")]
    InvalidValue {
        /// Raw input
        value: String,
        /// Target type name (`int32`, `int64`, `float`, `double`)
        target: &'static str,
    },

    /// A single-valued parameter received zero or several values.
    #[error("values count is {count}, want 1")]
    Arity {
        /// Number of values received
        count: usize,
    },
}

/// A contract violation found while validating a request or response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required parameter was not supplied.
    #[error("{location} parameter '{name}' is required")]
    MissingParameter {
        /// Parameter location
        location: ParamLocation,
        /// Parameter name
        name: String,
    },

    /// A parameter was supplied but could not be converted.
    #[error("{location} parameter '{name}' is invalid: {source}")]
    InvalidParameter {
        /// Parameter location
        location: ParamLocation,
        /// Parameter name
        name: String,
        /// Why conversion failed
        source: ConversionError,
    },

    /// The payload is not well-formed JSON.
    #[error("body contains invalid json: {reason}")]
    InvalidPayload {
        /// Decoder message
        reason: String,
    },

    /// The query string could not be parsed.
    #[error("malformed query string: {reason}")]
    MalformedQuery {
        /// Parser message
        reason: String,
    },

    /// The decoded payload does not match its schema.
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

/// Failure analyzing a contract into routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Two operations share an id.
    #[error("operation id '{0}' is declared more than once")]
    DuplicateOperationId(String),

    /// Two operations share a method and path.
    #[error("{method} {path} is declared by both '{first}' and '{second}'")]
    DuplicateRoute {
        /// Method
        method: Method,
        /// Path template
        path: String,
        /// First operation id
        first: String,
        /// Second operation id
        second: String,
    },

    /// An operation repeats a (name, location) parameter pair.
    #[error("operation '{operation_id}' declares {location} parameter '{name}' more than once")]
    DuplicateParameter {
        /// Operation id
        operation_id: String,
        /// Parameter name
        name: String,
        /// Parameter location
        location: ParamLocation,
    },

    /// A body parameter carries no schema.
    #[error("operation '{operation_id}' has body parameter '{name}' without a schema")]
    MissingBodySchema {
        /// Operation id
        operation_id: String,
        /// Parameter name
        name: String,
    },

    /// A non-body parameter carries no type.
    #[error("operation '{operation_id}' has parameter '{name}' without a type")]
    MissingParameterType {
        /// Operation id
        operation_id: String,
        /// Parameter name
        name: String,
    },

    /// A path template does not start with `/`.
    #[error("operation '{operation_id}' has invalid path '{path}'")]
    InvalidPath {
        /// Operation id
        operation_id: String,
        /// Path template
        path: String,
    },

    /// A custom operation source failed.
    #[error("contract analysis failed: {0}")]
    Analysis(String),
}
