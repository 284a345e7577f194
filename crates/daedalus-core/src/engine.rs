//! Routing engines.
//!
//! A [`RoutingEngine`] registers handlers against `(method, path pattern)`
//! pairs, mounts whole handlers under a path prefix, and dispatches
//! requests. [`TrieEngine`] is the default, backed by the radix tree in
//! `daedalus-router`.
//!
//! Mounting never rewrites the request URI. The engine that forwards a
//! request into a mount records the remaining path in a [`RoutePath`]
//! extension, and nested engines route on that instead of the URI. Captured
//! path parameters are published as a [`Params`] request extension, which
//! is what [`route_param`] reads.

use std::sync::Arc;

use bytes::Bytes;
use daedalus_router::{Lookup, Params, RouteError, Router};
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Method, StatusCode};
use http_body_util::Full;

use crate::context::RequestContext;
use crate::handler::{BoxFuture, BoxedHandler, Handler, Request, Response};

/// Pluggable request router.
pub trait RoutingEngine: Send + Sync + 'static {
    /// Registers `handler` for `method` requests whose path matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the engine rejects the pattern.
    fn route(&mut self, method: &Method, pattern: &str, handler: BoxedHandler) -> Result<(), RouteError>;

    /// Forwards every request under `prefix` to `handler`.
    fn mount(&mut self, prefix: &str, handler: BoxedHandler);

    /// Dispatches a request.
    fn serve(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response>;
}

/// Creates fresh, empty routing engines.
pub type EngineFactory = Arc<dyn Fn() -> Box<dyn RoutingEngine> + Send + Sync>;

/// Path an engine should route on, relative to the prefix it is mounted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath(pub String);

/// Reads a raw path parameter captured by [`TrieEngine`].
///
/// Returns an empty string when the parameter was not captured.
#[must_use]
pub fn route_param(request: &Request, name: &str) -> String {
    request
        .extensions()
        .get::<Params>()
        .and_then(|params| params.get(name))
        .unwrap_or_default()
        .to_string()
}

/// Adapts a finished engine into a [`Handler`] so it can be mounted.
#[derive(Clone)]
pub struct EngineHandler(pub Arc<dyn RoutingEngine>);

impl Handler for EngineHandler {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        self.0.serve(ctx, request)
    }
}

struct Mount {
    prefix: String,
    handler: BoxedHandler,
}

impl Mount {
    /// Remaining path if `path` lies under this mount.
    fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

/// Default routing engine.
///
/// Registered routes take precedence over mounts; among mounts the longest
/// matching prefix wins. Unmatched requests get `404 Not Found`, or
/// `405 Method Not Allowed` with an `Allow` header when the path is known.
#[derive(Default)]
pub struct TrieEngine {
    routes: Router<BoxedHandler>,
    mounts: Vec<Mount>,
}

impl TrieEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory producing [`TrieEngine`]s.
    #[must_use]
    pub fn factory() -> EngineFactory {
        Arc::new(|| Box::new(Self::new()))
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.route_count()
    }

    fn find_mount<'p>(&self, path: &'p str) -> Option<(&Mount, &'p str)> {
        self.mounts
            .iter()
            .filter_map(|mount| mount.strip(path).map(|rest| (mount, rest)))
            .max_by_key(|(mount, _)| mount.prefix.len())
    }
}

impl RoutingEngine for TrieEngine {
    fn route(&mut self, method: &Method, pattern: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        self.routes.route(method, pattern, handler)
    }

    fn mount(&mut self, prefix: &str, handler: BoxedHandler) {
        let trimmed = prefix.trim_end_matches('/');
        let prefix = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        self.mounts.push(Mount { prefix, handler });
    }

    fn serve(&self, ctx: RequestContext, mut request: Request) -> BoxFuture<'static, Response> {
        let path = request
            .extensions()
            .get::<RoutePath>()
            .map_or_else(|| request.uri().path().to_string(), |p| p.0.clone());

        let outcome = match self.routes.lookup(request.method(), &path) {
            Lookup::Found(found) => Ok((Arc::clone(found.endpoint), found.params)),
            Lookup::MethodNotAllowed(allowed) => Err(Some(allowed)),
            Lookup::NotFound => Err(None),
        };

        match outcome {
            Ok((handler, params)) => {
                let extensions = request.extensions_mut();
                extensions.remove::<RoutePath>();
                match extensions.get_mut::<Params>() {
                    Some(outer) => outer.extend(params),
                    None => {
                        extensions.insert(params);
                    }
                }
                handler.call(ctx, request)
            }
            Err(allowed) => {
                if let Some((mount, rest)) = self.find_mount(&path) {
                    let handler = Arc::clone(&mount.handler);
                    request.extensions_mut().insert(RoutePath(rest.to_string()));
                    return handler.call(ctx, request);
                }
                let response = match allowed {
                    Some(methods) => {
                        tracing::debug!(http.method = %request.method(), http.path = %path, "method not allowed");
                        method_not_allowed(&methods)
                    }
                    None => {
                        tracing::debug!(http.method = %request.method(), http.path = %path, "no route matched");
                        plain(StatusCode::NOT_FOUND, "404 page not found")
                    }
                };
                Box::pin(async move { response })
            }
        }
    }
}

fn plain(status: StatusCode, message: &'static str) -> Response {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

fn method_not_allowed(methods: &[Method]) -> Response {
    let mut response = plain(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
    let allow = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}
