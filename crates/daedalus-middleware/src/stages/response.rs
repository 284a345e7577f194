//! Response payload validation.
//!
//! Observational only: the handler's status, headers and bytes reach the
//! client unchanged whatever the outcome. Violations are logged and passed
//! to the error handler together with a detached copy of the response.

use std::sync::Arc;

use daedalus_core::{
    BasicSchemaValidator, BoxFuture, BoxedHandler, Handler, Request, RequestContext, Response,
    SchemaValidator, ValidationError,
};
use serde_json::Value;

use crate::error_handler::ErrorHandler;
use crate::middleware::Middleware;
use crate::recorder::ResponseRecorder;

/// Validates handler responses against the schema declared for their status.
#[derive(Clone)]
pub struct ResponseBodyValidator {
    error_handler: ErrorHandler,
    schema_validator: Arc<dyn SchemaValidator>,
    report_decode_errors: bool,
}

impl ResponseBodyValidator {
    /// Creates a validator using [`BasicSchemaValidator`].
    #[must_use]
    pub fn new(error_handler: ErrorHandler) -> Self {
        Self {
            error_handler,
            schema_validator: Arc::new(BasicSchemaValidator),
            report_decode_errors: true,
        }
    }

    /// Replaces the schema validator.
    #[must_use]
    pub fn with_schema_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.schema_validator = validator;
        self
    }

    /// Whether payloads that are not valid JSON are passed to the error
    /// handler. They are always logged.
    #[must_use]
    pub fn report_decode_errors(mut self, enabled: bool) -> Self {
        self.report_decode_errors = enabled;
        self
    }
}

impl std::fmt::Debug for ResponseBodyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBodyValidator")
            .field("report_decode_errors", &self.report_decode_errors)
            .finish_non_exhaustive()
    }
}

impl Middleware for ResponseBodyValidator {
    fn name(&self) -> &'static str {
        "response_validator"
    }

    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(ValidateResponse {
            validator: self.clone(),
            next,
        })
    }
}

struct ValidateResponse {
    validator: ResponseBodyValidator,
    next: BoxedHandler,
}

impl Handler for ValidateResponse {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        let Some(operation) = ctx.operation().cloned() else {
            return self.next.call(ctx, request);
        };
        let request_id = ctx.request_id();
        let validator = self.validator.clone();
        let downstream = self.next.call(ctx, request);

        Box::pin(async move {
            let response = downstream.await;
            let status = response.status();
            let Some(schema) = operation.response_schema(status.as_u16()) else {
                return response;
            };

            let recorded = ResponseRecorder::record(response).await;
            let errors = match serde_json::from_slice::<Value>(recorded.payload()) {
                Ok(value) => validator
                    .schema_validator
                    .validate(schema, &value)
                    .into_iter()
                    .map(ValidationError::from)
                    .collect::<Vec<_>>(),
                Err(error) => {
                    tracing::warn!(
                        %request_id,
                        operation_id = %operation.id(),
                        status = status.as_u16(),
                        %error,
                        "response body is not valid json"
                    );
                    if validator.report_decode_errors {
                        vec![ValidationError::InvalidPayload {
                            reason: error.to_string(),
                        }]
                    } else {
                        Vec::new()
                    }
                }
            };

            if !errors.is_empty() {
                tracing::warn!(
                    %request_id,
                    operation_id = %operation.id(),
                    status = status.as_u16(),
                    errors = errors.len(),
                    "response does not match contract"
                );
                let mut copy = recorded.detached();
                (validator.error_handler)(&mut copy, &errors);
            }

            recorded.into_response()
        })
    }
}
