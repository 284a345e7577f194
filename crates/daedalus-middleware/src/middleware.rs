//! Core middleware trait and composition.
//!
//! A middleware is a `handler -> handler` function: [`Middleware::apply`]
//! receives the handler it wraps and returns the wrapper. Composition is
//! plain repeated wrapping, so order is entirely up to the caller.

use std::future::Future;
use std::sync::Arc;

use daedalus_core::handler::{handler_fn, BoxedHandler, Request, Response};
use daedalus_core::RequestContext;

/// The core middleware trait.
///
/// # Invariants
///
/// - The returned handler SHOULD call the wrapped handler at most once per request
/// - A middleware that short-circuits MUST still return a response
pub trait Middleware: Send + Sync + 'static {
    /// Name used in logs and debugging output.
    fn name(&self) -> &'static str;

    /// Wraps `next`.
    fn apply(&self, next: BoxedHandler) -> BoxedHandler;
}

/// A shared, type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A middleware built from an async function.
///
/// The function receives the request context, the request and the wrapped
/// handler.
///
/// # Example
///
/// ```
/// use daedalus_core::Handler;
/// use daedalus_middleware::FnMiddleware;
///
/// let timing = FnMiddleware::new("timing", |ctx, request, next| async move {
///     let response = next.call(ctx.clone(), request).await;
///     tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
///     response
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: Arc<F>,
}

impl<F> FnMiddleware<F> {
    /// Creates a function-based middleware.
    pub fn new<Fut>(name: &'static str, func: F) -> Self
    where
        F: Fn(RequestContext, Request, BoxedHandler) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            name,
            func: Arc::new(func),
        }
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(RequestContext, Request, BoxedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        let func = Arc::clone(&self.func);
        handler_fn(move |ctx, request| (*func)(ctx, request, Arc::clone(&next)))
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An ordered list of middleware.
///
/// [`Chain::apply`] wraps the handler with each middleware in list order:
/// the first entry ends up innermost and the last entry outermost.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<BoxedMiddleware>,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware.
    pub fn push(&mut self, middleware: BoxedMiddleware) {
        self.layers.push(middleware);
    }

    /// Appends a middleware, builder style.
    #[must_use]
    pub fn with(mut self, middleware: BoxedMiddleware) -> Self {
        self.push(middleware);
        self
    }

    /// Wraps `handler` with every middleware, in order.
    #[must_use]
    pub fn apply(&self, handler: BoxedHandler) -> BoxedHandler {
        self.layers
            .iter()
            .fold(handler, |inner, middleware| middleware.apply(inner))
    }

    /// Middleware names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|m| m.name()).collect()
    }

    /// Number of middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
