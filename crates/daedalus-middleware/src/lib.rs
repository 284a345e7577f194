//! # Daedalus Middleware
//!
//! Handler-wrapping middleware and the contract validation stages.
//!
//! A [`Middleware`] turns one [`BoxedHandler`](daedalus_core::BoxedHandler)
//! into another. A [`Chain`] applies middleware in the order it was given,
//! so the middleware applied last is the outermost wrapper and runs first
//! at request time.
//!
//! ## Stages
//!
//! | Stage | Type | Purpose |
//! |-------|------|---------|
//! | Operation stamp | [`OperationStamp`] | Records the matched operation in the request context |
//! | Path parameters | [`PathParameterExtractor`] | Converts path variables to typed values |
//! | Query | [`QueryValidator`] | Checks query parameters, collecting every error |
//! | Body | [`BodyValidator`] | Checks the JSON payload and replays it downstream |
//! | Response | [`ResponseBodyValidator`] | Checks the handler's payload without altering it |
//!
//! Validation failures are never turned into responses here. Each
//! validating stage is given an [`ErrorHandler`] which decides the status
//! and payload clients see.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use daedalus_middleware::{json_error_handler, BodyValidator, Chain, QueryValidator};
//!
//! let errors = json_error_handler(http::StatusCode::UNPROCESSABLE_ENTITY);
//! let chain = Chain::new()
//!     .with(Arc::new(BodyValidator::new(errors.clone())))
//!     .with(Arc::new(QueryValidator::new(errors)));
//! assert_eq!(chain.names(), vec!["body_validator", "query_validator"]);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error_handler;
pub mod middleware;
pub mod recorder;
pub mod stages;

pub use error_handler::{error_handler, json_error_handler, ErrorHandler};
pub use middleware::{BoxedMiddleware, Chain, FnMiddleware, Middleware};
pub use recorder::ResponseRecorder;
pub use stages::{
    BodyValidator, OperationStamp, PathExtractor, PathParameterExtractor, QueryValidator,
    ResponseBodyValidator,
};
