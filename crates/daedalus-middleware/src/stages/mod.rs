//! Contract-driven middleware stages.

pub mod body;
pub mod operation;
pub mod path_params;
pub mod query;
pub mod response;

pub use body::BodyValidator;
pub use operation::OperationStamp;
pub use path_params::{PathExtractor, PathParameterExtractor};
pub use query::QueryValidator;
pub use response::ResponseBodyValidator;

use bytes::Bytes;
use daedalus_core::{BoxFuture, Response, ValidationError};
use http_body_util::Full;

use crate::error_handler::ErrorHandler;

/// Short-circuits with whatever the error handler writes.
fn reject(error_handler: &ErrorHandler, errors: &[ValidationError]) -> BoxFuture<'static, Response> {
    let mut response = Response::new(Full::new(Bytes::new()));
    error_handler(&mut response, errors);
    Box::pin(async move { response })
}
