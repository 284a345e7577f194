//! Caller-supplied reporting of validation failures.
//!
//! Validation stages collect [`ValidationError`]s and hand them, together
//! with a response to write into, to an [`ErrorHandler`]. The handler owns
//! every decision about what the client sees.

use std::sync::Arc;

use bytes::Bytes;
use daedalus_core::{Response, ValidationError};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;

/// Writes a client-facing report of validation errors into a response.
pub type ErrorHandler = Arc<dyn Fn(&mut Response, &[ValidationError]) + Send + Sync>;

/// Boxes a closure as an [`ErrorHandler`].
pub fn error_handler<F>(func: F) -> ErrorHandler
where
    F: Fn(&mut Response, &[ValidationError]) + Send + Sync + 'static,
{
    Arc::new(func)
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: EnvelopeBody<'a>,
}

#[derive(Serialize)]
struct EnvelopeBody<'a> {
    code: &'a str,
    message: &'a str,
    details: Vec<String>,
}

/// An [`ErrorHandler`] that replaces the response with a JSON envelope:
///
/// ```json
/// {"error": {"code": "VALIDATION_FAILED", "message": "...", "details": ["..."]}}
/// ```
pub fn json_error_handler(status: StatusCode) -> ErrorHandler {
    error_handler(move |response, errors| {
        let envelope = Envelope {
            error: EnvelopeBody {
                code: "VALIDATION_FAILED",
                message: "request does not match the API contract",
                details: errors.iter().map(ToString::to_string).collect(),
            },
        };
        let body = serde_json::to_vec(&envelope).unwrap_or_default();

        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *response.body_mut() = Full::new(Bytes::from(body));
    })
}
