//! Query string validation.
//!
//! Every query parameter declared by the matched operation is checked for
//! presence (when required) and convertibility to its declared type. All
//! violations are collected before the error handler is called once with
//! the full list.

use std::collections::HashMap;
use std::sync::Arc;

use daedalus_core::{
    convert_parameter, BoxFuture, BoxedHandler, Handler, ParamLocation, Parameter, Request,
    RequestContext, Response, ValidationError,
};

use crate::error_handler::ErrorHandler;
use crate::middleware::Middleware;
use crate::stages::reject;

/// Query values by key, in the order they appeared.
pub type QueryValues = HashMap<String, Vec<String>>;

/// Parses a raw query string (without the leading `?`).
///
/// # Errors
///
/// Returns the decoder error for malformed input.
pub fn parse_query(query: &str) -> Result<QueryValues, serde_urlencoded::de::Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
    let mut values = QueryValues::new();
    for (key, value) in pairs {
        values.entry(key).or_default().push(value);
    }
    Ok(values)
}

/// Checks the query parameters among `parameters` against `values`.
///
/// Returns every violation found; an empty list means the query is valid.
pub fn validate_query(parameters: &[Parameter], values: &QueryValues) -> Vec<ValidationError> {
    parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Query)
        .filter_map(|param| match values.get(&param.name) {
            None => param.required.then(|| ValidationError::MissingParameter {
                location: ParamLocation::Query,
                name: param.name.clone(),
            }),
            Some(raw) => param
                .declared_type()
                .and_then(|param_type| convert_parameter(raw, param_type, &param.format))
                .err()
                .map(|source| ValidationError::InvalidParameter {
                    location: ParamLocation::Query,
                    name: param.name.clone(),
                    source,
                }),
        })
        .collect()
}

/// Validates query parameters against the matched operation.
///
/// By default a failed validation stops the chain. With
/// [`continue_on_error`](Self::continue_on_error) the downstream handler
/// still runs, and the error handler is applied to the response it
/// produced.
#[derive(Clone)]
pub struct QueryValidator {
    error_handler: ErrorHandler,
    continue_on_error: bool,
}

impl QueryValidator {
    /// Creates a validator reporting through `error_handler`.
    #[must_use]
    pub fn new(error_handler: ErrorHandler) -> Self {
        Self {
            error_handler,
            continue_on_error: false,
        }
    }

    /// Keeps processing the request after reporting errors.
    #[must_use]
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }
}

impl std::fmt::Debug for QueryValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryValidator")
            .field("continue_on_error", &self.continue_on_error)
            .finish_non_exhaustive()
    }
}

impl Middleware for QueryValidator {
    fn name(&self) -> &'static str {
        "query_validator"
    }

    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(ValidateQuery {
            validator: self.clone(),
            next,
        })
    }
}

struct ValidateQuery {
    validator: QueryValidator,
    next: BoxedHandler,
}

impl Handler for ValidateQuery {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        let Some(operation) = ctx.operation().cloned() else {
            return self.next.call(ctx, request);
        };

        let errors = match parse_query(request.uri().query().unwrap_or_default()) {
            Ok(values) => validate_query(operation.parameters(), &values),
            Err(error) => vec![ValidationError::MalformedQuery {
                reason: error.to_string(),
            }],
        };
        if errors.is_empty() {
            return self.next.call(ctx, request);
        }

        tracing::debug!(
            request_id = %ctx.request_id(),
            operation_id = %operation.id(),
            errors = errors.len(),
            "query validation failed"
        );

        if !self.validator.continue_on_error {
            return reject(&self.validator.error_handler, &errors);
        }

        let error_handler = Arc::clone(&self.validator.error_handler);
        let downstream = self.next.call(ctx, request);
        Box::pin(async move {
            let mut response = downstream.await;
            error_handler(&mut response, &errors);
            response
        })
    }
}
