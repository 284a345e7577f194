//! Radix tree route table for Daedalus.
//!
//! The table maps `(method, path pattern)` pairs to an arbitrary endpoint
//! value. Patterns use `{name}` for a single captured segment and `*name`
//! for a trailing catch-all:
//!
//! ```rust
//! use daedalus_router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.route(&Method::GET, "/pet/{petId}", "getPetById").unwrap();
//! router.route(&Method::DELETE, "/pet/{petId}", "deletePet").unwrap();
//!
//! let found = router.match_route(&Method::GET, "/pet/12").unwrap();
//! assert_eq!(*found.endpoint, "getPetById");
//! assert_eq!(found.params.get("petId"), Some("12"));
//! ```
//!
//! Lookup priority at every level is static segment, then parameter, then
//! wildcard. A path that matches with no entry for the request method is
//! reported as [`Lookup::MethodNotAllowed`] so callers can answer 405.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;

pub use error::RouteError;
pub use params::Params;
pub use router::{Lookup, Router};

/// A matched route: the registered endpoint plus captured path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// Endpoint registered for the method and path
    pub endpoint: &'a T,
    /// Captured path parameters
    pub params: Params,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(endpoint: &'a T, params: Params) -> Self {
        Self { endpoint, params }
    }
}
