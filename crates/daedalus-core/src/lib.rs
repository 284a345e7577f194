//! Core types for Daedalus.
//!
//! This crate holds everything the request pipeline shares:
//!
//! - [`contract`]: the operation model read from an API contract, and the
//!   [`OperationSource`](contract::OperationSource) seam that yields the
//!   method → path → operation view
//! - [`schema`]: payload schemas and the [`SchemaValidator`](schema::SchemaValidator) seam
//! - [`convert`]: string → typed value conversion for declared parameter types
//! - [`context`]: per-request metadata threaded through the handler chain
//! - [`handler`]: the async handler abstraction and operation registry
//! - [`engine`]: the pluggable routing engine and its default trie implementation
//! - [`error`]: conversion, validation and contract errors

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod contract;
pub mod convert;
pub mod engine;
pub mod error;
pub mod handler;
pub mod schema;

pub use context::{RequestContext, RequestId};
pub use contract::{
    Contract, Operation, OperationId, OperationSource, OperationsView, ParamLocation, ParamType,
    Parameter, ResponseSpec,
};
pub use convert::{convert_parameter, convert_primitive, TypedValue};
pub use engine::{route_param, EngineFactory, EngineHandler, RoutePath, RoutingEngine, TrieEngine};
pub use error::{ContractError, ConversionError, ValidationError};
pub use handler::{
    handler_fn, BoxFuture, BoxedHandler, FnHandler, Handler, OperationHandlers, Request, Response,
};
pub use schema::{BasicSchemaValidator, Schema, SchemaValidator, SchemaViolation};
