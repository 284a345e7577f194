//! Operation identity stamp.
//!
//! Applied last when a route is composed, so it is the outermost wrapper
//! and the first code to run for the request. Everything downstream,
//! including caller middleware, can read the matched operation from the
//! [`RequestContext`](daedalus_core::RequestContext).

use std::sync::Arc;

use daedalus_core::{BoxFuture, BoxedHandler, Handler, Operation, Request, RequestContext, Response};

use crate::middleware::Middleware;

/// Stamps the matched operation onto the request context.
#[derive(Debug, Clone)]
pub struct OperationStamp {
    operation: Arc<Operation>,
}

impl OperationStamp {
    /// Creates a stamp for `operation`.
    #[must_use]
    pub fn new(operation: Arc<Operation>) -> Self {
        Self { operation }
    }
}

impl Middleware for OperationStamp {
    fn name(&self) -> &'static str {
        "operation_stamp"
    }

    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(Stamped {
            operation: Arc::clone(&self.operation),
            next,
        })
    }
}

struct Stamped {
    operation: Arc<Operation>,
    next: BoxedHandler,
}

impl Handler for Stamped {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        tracing::debug!(
            request_id = %ctx.request_id(),
            operation_id = %self.operation.id(),
            http.method = %request.method(),
            http.path = %request.uri().path(),
            "dispatching operation"
        );
        self.next
            .call(ctx.with_operation(Arc::clone(&self.operation)), request)
    }
}
