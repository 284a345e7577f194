//! Request handlers.
//!
//! Everything in the request path (user handlers, validation stages and
//! routing engines) is a [`Handler`]: an object that turns a
//! [`RequestContext`] plus a [`Request`] into a future [`Response`].
//! Handlers are shared as [`BoxedHandler`] so a composed chain can be
//! registered once and invoked concurrently.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;

use crate::context::RequestContext;
use crate::contract::OperationId;

/// The HTTP request type used throughout the pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used throughout the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An asynchronous request handler.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use daedalus_core::{BoxFuture, Handler, Request, RequestContext, Response};
/// use http_body_util::Full;
///
/// struct Health;
///
/// impl Handler for Health {
///     fn call(&self, _ctx: RequestContext, _request: Request) -> BoxFuture<'static, Response> {
///         Box::pin(async { Response::new(Full::new(Bytes::from_static(b"ok"))) })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles one request.
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response>;
}

/// A shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Handlers bound to contract operations, keyed by operation id.
pub type OperationHandlers = HashMap<OperationId, BoxedHandler>;

/// A handler backed by an async closure.
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    /// Wraps a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        Box::pin((self.func)(ctx, request))
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

/// Boxes an async closure as a [`BoxedHandler`].
pub fn handler_fn<F, Fut>(func: F) -> BoxedHandler
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(FnHandler::new(func))
}
