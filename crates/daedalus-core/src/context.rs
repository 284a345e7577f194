//! Request context types.
//!
//! The [`RequestContext`] carries per-request metadata through the handler
//! chain: the matched contract operation, decoded path parameters and a
//! request id for log correlation. It is never mutated in place; each stage
//! derives a new value with one of the `with_*` methods and hands it on.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::{Operation, OperationId};
use crate::convert::TypedValue;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new request id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID, e.g. one read from an inbound header.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request metadata.
///
/// # Example
///
/// ```
/// use daedalus_core::{RequestContext, TypedValue};
///
/// let ctx = RequestContext::new();
/// assert!(ctx.operation().is_none());
///
/// let ctx = ctx.with_path_param("petId", TypedValue::Int64(12));
/// assert_eq!(ctx.path_param("petId"), Some(&TypedValue::Int64(12)));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    operation: Option<Arc<Operation>>,
    path_params: Arc<HashMap<String, TypedValue>>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context with a fresh request id and no metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context for a known request id.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            operation: None,
            path_params: Arc::default(),
            started_at: Instant::now(),
        }
    }

    /// Derives a context carrying the matched operation.
    #[must_use]
    pub fn with_operation(mut self, operation: Arc<Operation>) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Derives a context carrying one more decoded path parameter.
    ///
    /// Clones the parameter map first if another context still shares it.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        Arc::make_mut(&mut self.path_params).insert(name.into(), value);
        self
    }

    /// Request id.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// The contract operation matched for this request.
    #[must_use]
    pub fn operation(&self) -> Option<&Arc<Operation>> {
        self.operation.as_ref()
    }

    /// Id of the matched operation.
    #[must_use]
    pub fn operation_id(&self) -> Option<&OperationId> {
        self.operation.as_deref().map(Operation::id)
    }

    /// A decoded path parameter.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&TypedValue> {
        self.path_params.get(name)
    }

    /// All decoded path parameters.
    #[must_use]
    pub fn path_params(&self) -> &HashMap<String, TypedValue> {
        &self.path_params
    }

    /// Time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn operation() -> Arc<Operation> {
        Arc::new(
            Operation::builder("getPetById")
                .method(Method::GET)
                .path("/pet/{petId}")
                .build(),
        )
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_request_id_from_uuid() {
        let uuid = Uuid::now_v7();
        let id = RequestId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_with_operation() {
        let ctx = RequestContext::new().with_operation(operation());
        assert_eq!(ctx.operation_id().map(OperationId::as_str), Some("getPetById"));
        assert_eq!(ctx.operation().unwrap().method(), &Method::GET);
    }

    #[test]
    fn test_derivation_leaves_original_untouched() {
        let base = RequestContext::new().with_path_param("a", TypedValue::Int64(1));
        let derived = base.clone().with_path_param("b", TypedValue::Boolean(true));

        assert_eq!(base.path_params().len(), 1);
        assert_eq!(derived.path_params().len(), 2);
        assert_eq!(derived.request_id(), base.request_id());
    }

    #[test]
    fn test_missing_path_param() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.path_param("petId"), None);
    }
}
