//! Request payload validation.
//!
//! The payload is buffered, decoded as JSON and checked against the schema
//! of each body parameter. Only the first JSON value is decoded; trailing
//! bytes are not checked. Accepted requests are rebuilt around the exact
//! buffered bytes so the downstream handler reads the original payload.

use std::sync::Arc;

use daedalus_core::{
    BasicSchemaValidator, BoxFuture, BoxedHandler, Handler, Operation, ParamLocation, Request,
    RequestContext, Response, SchemaValidator, ValidationError,
};
use http_body_util::{BodyExt, Full};
use serde_json::Value;

use crate::error_handler::ErrorHandler;
use crate::middleware::Middleware;
use crate::stages::reject;

/// Checks a decoded payload against every body parameter of `operation`.
pub fn validate_body(
    operation: &Operation,
    payload: &Value,
    validator: &dyn SchemaValidator,
) -> Vec<ValidationError> {
    operation
        .parameters_in(ParamLocation::Body)
        .filter_map(|param| param.schema.as_ref())
        .flat_map(|schema| validator.validate(schema, payload))
        .map(ValidationError::from)
        .collect()
}

/// Decodes the first JSON value of `payload`. Anything after it is ignored.
fn decode_first(payload: &[u8]) -> Result<Value, String> {
    match serde_json::Deserializer::from_slice(payload).into_iter::<Value>().next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(error)) => Err(error.to_string()),
        None => Err("no JSON value in payload".to_string()),
    }
}

/// Validates request payloads against the matched operation.
#[derive(Clone)]
pub struct BodyValidator {
    error_handler: ErrorHandler,
    schema_validator: Arc<dyn SchemaValidator>,
}

impl BodyValidator {
    /// Creates a validator using [`BasicSchemaValidator`].
    #[must_use]
    pub fn new(error_handler: ErrorHandler) -> Self {
        Self {
            error_handler,
            schema_validator: Arc::new(BasicSchemaValidator),
        }
    }

    /// Replaces the schema validator.
    #[must_use]
    pub fn with_schema_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.schema_validator = validator;
        self
    }
}

impl std::fmt::Debug for BodyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyValidator").finish_non_exhaustive()
    }
}

impl Middleware for BodyValidator {
    fn name(&self) -> &'static str {
        "body_validator"
    }

    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(ValidateBody {
            validator: self.clone(),
            next,
        })
    }
}

struct ValidateBody {
    validator: BodyValidator,
    next: BoxedHandler,
}

impl Handler for ValidateBody {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        let Some(operation) = ctx.operation().cloned() else {
            return self.next.call(ctx, request);
        };
        let next = Arc::clone(&self.next);
        let error_handler = Arc::clone(&self.validator.error_handler);
        let schema_validator = Arc::clone(&self.validator.schema_validator);

        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let payload = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(never) => match never {},
            };

            if !payload.is_empty() {
                let errors = match decode_first(&payload) {
                    Ok(value) => validate_body(&operation, &value, schema_validator.as_ref()),
                    Err(reason) => vec![ValidationError::InvalidPayload { reason }],
                };
                if !errors.is_empty() {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        operation_id = %operation.id(),
                        errors = errors.len(),
                        "request body validation failed"
                    );
                    return reject(&error_handler, &errors).await;
                }
            }

            next.call(ctx, Request::from_parts(parts, Full::new(payload)))
                .await
        })
    }
}
