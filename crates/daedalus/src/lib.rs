//! # Daedalus
//!
//! **Contract-driven HTTP request pipeline**
//!
//! Daedalus binds the operations of an API contract to application
//! handlers and enforces the contract on every request:
//!
//! - **Typed path parameters**: declared path variables are converted and
//!   exposed through [`RequestContext::path_param`](core::RequestContext::path_param)
//! - **Query validation**: every violation is collected, not just the first
//! - **Body validation**: JSON payloads are checked against the body schema
//!   and replayed unchanged to the handler
//! - **Response validation**: handler output is checked and reported, never altered
//! - **Pluggable routing**: any [`RoutingEngine`](core::RoutingEngine), with a
//!   radix-tree engine by default
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use daedalus::prelude::*;
//!
//! let mut handlers = OperationHandlers::new();
//! handlers.insert("getPetById".into(), handler_fn(get_pet));
//!
//! let validation = ContractValidation::new(json_error_handler(StatusCode::BAD_REQUEST));
//! let router = build_router(&contract, &handlers, validation)?;
//!
//! let response = router.serve(request).await;
//! ```
//!
//! ## Pipeline
//!
//! For each bound operation the handler is wrapped with caller middleware
//! in the order given, then with the operation stamp. At request time:
//!
//! ```text
//! Request → Engine → OperationStamp → Response → PathParams → Query → Body → Handler
//! ```
//!
//! Violations are never turned into responses by Daedalus itself. Each
//! validator hands them to an [`ErrorHandler`](middleware::ErrorHandler)
//! supplied by the application.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod options;
mod router;
mod validation;

pub use daedalus_config as config;
pub use daedalus_core as core;
pub use daedalus_middleware as middleware;
pub use daedalus_router as routing;
pub use daedalus_telemetry as telemetry;

pub use error::BuildError;
pub use options::RouterOption;
pub use router::{build_router, Router};
pub use validation::ContractValidation;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use daedalus::prelude::*;
///
/// let handlers = OperationHandlers::new();
/// let contract = Contract::builder().build();
/// let router = build_router(&contract, &handlers, []).unwrap();
/// # let _ = router;
/// ```
pub mod prelude {
    pub use crate::{build_router, BuildError, ContractValidation, Router, RouterOption};

    pub use daedalus_core::{
        handler_fn, BoxedHandler, Contract, Handler, Operation, OperationHandlers,
        OperationId, OperationSource, ParamType, Parameter, Request, RequestContext,
        ResponseSpec, Response, Schema, TypedValue, ValidationError,
    };

    pub use daedalus_middleware::{error_handler, json_error_handler, FnMiddleware, Middleware};

    pub use daedalus_config::{ConfigLoader, DaedalusConfig};
    pub use daedalus_telemetry::build_dispatch;
}
