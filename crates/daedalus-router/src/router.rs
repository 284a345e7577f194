//! Route table front end.

use http::Method;

use crate::error::RouteError;
use crate::node::Node;
use crate::RouteMatch;

/// Outcome of a lookup that distinguishes "no such path" from "wrong method".
#[derive(Debug)]
pub enum Lookup<'a, T> {
    /// Path and method matched.
    Found(RouteMatch<'a, T>),
    /// Path matched, method did not; carries the registered methods.
    MethodNotAllowed(Vec<Method>),
    /// No pattern matches the path.
    NotFound,
}

/// Radix tree route table.
///
/// # Route Priority
///
/// When several patterns could match, static segments win over
/// `{param}` segments, which win over `*wildcard` segments. So
/// `/pet/findByStatus` is preferred over `/pet/{petId}` for that path.
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty route table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers `endpoint` for `method` requests matching `pattern`.
    ///
    /// # Errors
    ///
    /// See [`RouteError`].
    pub fn route(&mut self, method: &Method, pattern: &str, endpoint: T) -> Result<(), RouteError> {
        self.root.insert(pattern, method.clone(), endpoint)?;
        self.route_count += 1;
        Ok(())
    }

    /// Matches a method and concrete path.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        match self.lookup(method, path) {
            Lookup::Found(found) => Some(found),
            Lookup::MethodNotAllowed(_) | Lookup::NotFound => None,
        }
    }

    /// Matches a method and concrete path, reporting why nothing matched.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        let Some((methods, captures)) = self.root.match_path(path) else {
            return Lookup::NotFound;
        };
        match methods.endpoint(method) {
            Some(route) => Lookup::Found(RouteMatch::new(&route.endpoint, route.bind(captures))),
            None => Lookup::MethodNotAllowed(methods.allowed_methods()),
        }
    }

    /// Number of `(method, pattern)` registrations.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
