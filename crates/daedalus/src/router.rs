//! Binding contract operations to handlers.
//!
//! [`build_router`] runs once. It reads the operations view from an
//! [`OperationSource`], wraps every bound handler with the configured
//! middleware and the operation stamp, registers the result on a fresh
//! engine, and mounts that engine at the contract's base path. The
//! returned [`Router`] is immutable and can serve any number of requests
//! concurrently.

use std::sync::Arc;

use daedalus_core::{
    BoxFuture, EngineHandler, Handler, OperationHandlers, OperationSource, Request,
    RequestContext, Response, RoutingEngine,
};
use daedalus_middleware::{Middleware, OperationStamp};
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

use crate::error::BuildError;
use crate::options::{RouterOption, RouterOptions};

/// Builds a router serving every operation of `source` that has a handler.
///
/// Operations without an entry in `handlers` are logged at `warn` and left
/// unrouted. Custom middleware wrap each handler in the order given; the
/// operation stamp is applied after them, so at request time it runs first
/// and every middleware can read the matched operation.
///
/// # Errors
///
/// Returns [`BuildError`] if the source cannot produce its operations view
/// or the engine rejects a path.
///
/// # Example
///
/// ```
/// use daedalus::{build_router, RouterOption};
/// use daedalus::core::{handler_fn, Contract, Operation, OperationHandlers, Response};
///
/// let contract = Contract::builder()
///     .base_path("/v2")
///     .operation(Operation::builder("getInventory").path("/store/inventory").build())
///     .build();
///
/// let mut handlers = OperationHandlers::new();
/// handlers.insert(
///     "getInventory".into(),
///     handler_fn(|_ctx, _request| async { Response::default() }),
/// );
///
/// let router = build_router(&contract, &handlers, []).unwrap();
/// # let _ = router;
/// ```
pub fn build_router<S>(
    source: &S,
    handlers: &OperationHandlers,
    options: impl IntoIterator<Item = RouterOption>,
) -> Result<Router, BuildError>
where
    S: OperationSource + ?Sized,
{
    let options: RouterOptions = options.into_iter().collect();
    let engine = tracing::dispatcher::with_default(&options.logger, || {
        bind(source, handlers, &options)
    })?;

    Ok(Router {
        engine,
        logger: options.logger,
    })
}

fn bind<S>(
    source: &S,
    handlers: &OperationHandlers,
    options: &RouterOptions,
) -> Result<Arc<dyn RoutingEngine>, BuildError>
where
    S: OperationSource + ?Sized,
{
    let view = source.operations()?;
    let mut operations = (options.engine)();

    for (method, paths) in &view {
        for (path, operation) in paths {
            let Some(handler) = handlers.get(operation.id()) else {
                tracing::warn!(
                    operation_id = %operation.id(),
                    http.method = %method,
                    http.path = %path,
                    "no handler registered for operation"
                );
                continue;
            };

            let wrapped = options.middleware.apply(Arc::clone(handler));
            let stamped = OperationStamp::new(Arc::clone(operation)).apply(wrapped);
            operations.route(method, path, stamped)?;

            tracing::debug!(
                operation_id = %operation.id(),
                http.method = %method,
                http.path = %path,
                middleware = ?options.middleware.names(),
                "registered route"
            );
        }
    }

    let mut top = (options.engine)();
    top.mount(
        source.base_path(),
        Arc::new(EngineHandler(Arc::from(operations))),
    );
    Ok(Arc::from(top))
}

/// A built request router.
#[derive(Clone)]
pub struct Router {
    engine: Arc<dyn RoutingEngine>,
    logger: Dispatch,
}

impl Router {
    /// Serves one request with a fresh [`RequestContext`].
    ///
    /// All logging for the request, including from handlers, goes to the
    /// logger the router was built with.
    pub fn serve(&self, request: Request) -> BoxFuture<'static, Response> {
        self.call(RequestContext::new(), request)
    }
}

impl Handler for Router {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        let future = tracing::dispatcher::with_default(&self.logger, || {
            self.engine.serve(ctx, request)
        });
        Box::pin(future.with_subscriber(self.logger.clone()))
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}
