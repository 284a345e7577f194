//! Path parameter extraction.
//!
//! For every path parameter of the matched operation, reads the raw value
//! through a [`PathExtractor`], converts it to the declared type, and stores
//! it in the request context under the parameter name. Values that fail to
//! convert are skipped; they never produce a client-visible error.

use std::sync::Arc;

use daedalus_core::{
    convert_primitive, route_param, BoxFuture, BoxedHandler, Handler, ParamLocation, Request,
    RequestContext, Response,
};

use crate::middleware::Middleware;

/// Reads the raw value of a named path variable from a request.
pub type PathExtractor = Arc<dyn Fn(&Request, &str) -> String + Send + Sync>;

/// Decodes path parameters into the request context.
#[derive(Clone)]
pub struct PathParameterExtractor {
    extractor: PathExtractor,
}

impl PathParameterExtractor {
    /// Uses a custom extraction function, for routing engines that expose
    /// path variables some other way.
    #[must_use]
    pub fn new(extractor: PathExtractor) -> Self {
        Self { extractor }
    }
}

impl Default for PathParameterExtractor {
    /// Reads parameters captured by the default trie engine.
    fn default() -> Self {
        Self::new(Arc::new(route_param))
    }
}

impl std::fmt::Debug for PathParameterExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathParameterExtractor").finish_non_exhaustive()
    }
}

impl Middleware for PathParameterExtractor {
    fn name(&self) -> &'static str {
        "path_parameters"
    }

    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(ExtractPathParams {
            extractor: Arc::clone(&self.extractor),
            next,
        })
    }
}

struct ExtractPathParams {
    extractor: PathExtractor,
    next: BoxedHandler,
}

impl Handler for ExtractPathParams {
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, Response> {
        let Some(operation) = ctx.operation().cloned() else {
            return self.next.call(ctx, request);
        };

        let mut ctx = ctx;
        for param in operation.parameters_in(ParamLocation::Path) {
            let raw = (self.extractor)(&request, &param.name);
            let converted = param
                .declared_type()
                .and_then(|param_type| convert_primitive(&raw, param_type, &param.format));
            match converted {
                Ok(value) => ctx = ctx.with_path_param(param.name.clone(), value),
                Err(error) => tracing::debug!(
                    request_id = %ctx.request_id(),
                    operation_id = %operation.id(),
                    parameter = %param.name,
                    %error,
                    "path parameter not decoded"
                ),
            }
        }
        self.next.call(ctx, request)
    }
}
