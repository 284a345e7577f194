//! Per-path method table.
//!
//! [`MethodRouter`] maps HTTP methods to endpoints for a single path. Any
//! [`Method`] is accepted, including extension methods.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to endpoints for a single route.
#[derive(Debug, Clone)]
pub(crate) struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); 4]>,
}

impl<T> MethodRouter<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Registers an endpoint for `method`.
    ///
    /// Returns the rejected endpoint when the method is already taken.
    pub(crate) fn insert(&mut self, method: Method, endpoint: T) -> Option<T> {
        if self.entries.iter().any(|(m, _)| *m == method) {
            return Some(endpoint);
        }
        self.entries.push((method, endpoint));
        None
    }

    pub(crate) fn endpoint(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, endpoint)| endpoint)
    }

    /// Methods registered for this path, in registration order.
    pub(crate) fn allowed_methods(&self) -> Vec<Method> {
        self.entries.iter().map(|(m, _)| m.clone()).collect()
    }
}
