//! Router construction options.

use std::sync::Arc;

use daedalus_core::{EngineFactory, TrieEngine};
use daedalus_middleware::{BoxedMiddleware, Chain, Middleware};
use tracing::Dispatch;

/// One customization passed to [`build_router`](crate::build_router).
///
/// Options apply in the order given. Later logger or engine options replace
/// earlier ones; middleware options accumulate.
#[derive(Clone)]
pub enum RouterOption {
    /// Sink for build-time and request-time logs.
    Logger(Dispatch),
    /// Routing engine used for both the operation routes and the base-path mount.
    Engine(EngineFactory),
    /// A middleware wrapped around every bound handler.
    Middleware(BoxedMiddleware),
}

impl RouterOption {
    /// Sets the logging sink.
    #[must_use]
    pub fn logger(dispatch: impl Into<Dispatch>) -> Self {
        Self::Logger(dispatch.into())
    }

    /// Sets the routing engine.
    #[must_use]
    pub fn engine(factory: EngineFactory) -> Self {
        Self::Engine(factory)
    }

    /// Appends a middleware. The first middleware appended is the innermost wrapper.
    #[must_use]
    pub fn middleware(middleware: impl Middleware) -> Self {
        Self::Middleware(Arc::new(middleware))
    }
}

impl std::fmt::Debug for RouterOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logger(_) => f.write_str("Logger"),
            Self::Engine(_) => f.write_str("Engine"),
            Self::Middleware(m) => f.debug_tuple("Middleware").field(&m.name()).finish(),
        }
    }
}

/// Resolved options.
#[derive(Clone)]
pub(crate) struct RouterOptions {
    pub(crate) logger: Dispatch,
    pub(crate) engine: EngineFactory,
    pub(crate) middleware: Chain,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            logger: Dispatch::none(),
            engine: TrieEngine::factory(),
            middleware: Chain::new(),
        }
    }
}

impl FromIterator<RouterOption> for RouterOptions {
    fn from_iter<I: IntoIterator<Item = RouterOption>>(options: I) -> Self {
        options
            .into_iter()
            .fold(Self::default(), |mut resolved, option| {
                match option {
                    RouterOption::Logger(dispatch) => resolved.logger = dispatch,
                    RouterOption::Engine(factory) => resolved.engine = factory,
                    RouterOption::Middleware(middleware) => resolved.middleware.push(middleware),
                }
                resolved
            })
    }
}
