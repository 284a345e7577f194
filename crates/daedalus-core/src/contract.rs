//! Contract operation model.
//!
//! A [`Contract`] is the in-memory form of an API description: a base path
//! plus a list of [`Operation`]s, each with its method, path template,
//! parameters and per-status responses. The router never walks a contract
//! directly; it asks an [`OperationSource`] for the normalized
//! method → path → operation view, which lets callers plug in their own
//! contract loaders.
//!
//! # Example
//!
//! ```
//! use daedalus_core::contract::{Contract, Operation, OperationSource, Parameter, ParamType, ResponseSpec};
//! use daedalus_core::schema::Schema;
//! use http::Method;
//!
//! let contract = Contract::builder()
//!     .base_path("/v2")
//!     .operation(
//!         Operation::builder("getPetById")
//!             .method(Method::GET)
//!             .path("/pet/{petId}")
//!             .parameter(Parameter::path("petId", ParamType::Integer).format("int64"))
//!             .response(200, ResponseSpec::new("pet").schema(Schema::object(vec![("name", Schema::string())])))
//!             .response(404, ResponseSpec::new("not found"))
//!             .build(),
//!     )
//!     .build();
//!
//! let view = contract.operations().unwrap();
//! assert!(view[&Method::GET].contains_key("/pet/{petId}"));
//! ```

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ConversionError};
use crate::schema::Schema;

/// Unique identifier of a contract operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    /// Creates an operation id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for OperationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OperationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a parameter lives in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    /// Path template variable
    Path,
    /// Query string
    Query,
    /// Request header (declared only, not validated)
    Header,
    /// Request payload
    Body,
    /// Form field (declared only, not validated)
    FormData,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
            Self::FormData => "formData",
        })
    }
}

/// Declared primitive type of a non-body parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `file`
    File,
}

impl ParamType {
    /// Contract spelling of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            "file" => Ok(Self::File),
            other => Err(ConversionError::UnknownType(other.to_string())),
        }
    }
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Location in the request
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Declared type; absent for body parameters
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<ParamType>,
    /// Declared format, empty when unspecified
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Whether the parameter must be present
    #[serde(default)]
    pub required: bool,
    /// Payload schema for body parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    fn typed(name: impl Into<String>, location: ParamLocation, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            location,
            param_type: Some(param_type),
            format: String::new(),
            required: false,
            schema: None,
        }
    }

    /// A path parameter. Path parameters are always required.
    #[must_use]
    pub fn path(name: impl Into<String>, param_type: ParamType) -> Self {
        Self::typed(name, ParamLocation::Path, param_type).required()
    }

    /// An optional query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>, param_type: ParamType) -> Self {
        Self::typed(name, ParamLocation::Query, param_type)
    }

    /// An optional header parameter.
    #[must_use]
    pub fn header(name: impl Into<String>, param_type: ParamType) -> Self {
        Self::typed(name, ParamLocation::Header, param_type)
    }

    /// An optional form field.
    #[must_use]
    pub fn form_data(name: impl Into<String>, param_type: ParamType) -> Self {
        Self::typed(name, ParamLocation::FormData, param_type)
    }

    /// A body parameter validated against `schema`.
    #[must_use]
    pub fn body(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            location: ParamLocation::Body,
            param_type: None,
            format: String::new(),
            required: false,
            schema: Some(schema),
        }
    }

    /// Sets the declared format.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declared type of a non-body parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::UnknownType`] when no type was declared.
    pub fn declared_type(&self) -> Result<ParamType, ConversionError> {
        self.param_type
            .ok_or_else(|| ConversionError::UnknownType(String::new()))
    }
}

/// A declared response for one status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Payload schema; `None` for responses without a body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl ResponseSpec {
    /// A response without a payload schema.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            schema: None,
        }
    }

    /// Attaches a payload schema.
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A contract operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    id: OperationId,
    #[serde(with = "http_method_serde")]
    method: Method,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    responses: BTreeMap<u16, ResponseSpec>,
    #[serde(default)]
    tags: Vec<String>,
}

impl Operation {
    /// Starts building an operation.
    #[must_use]
    pub fn builder(id: impl Into<OperationId>) -> OperationBuilder {
        OperationBuilder::new(id)
    }

    /// Operation identifier.
    #[must_use]
    pub fn id(&self) -> &OperationId {
        &self.id
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path template relative to the contract base path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Summary line, if any.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// All declared parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parameters declared at `location`.
    pub fn parameters_in(&self, location: ParamLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    /// Declared responses keyed by status code.
    #[must_use]
    pub fn responses(&self) -> &BTreeMap<u16, ResponseSpec> {
        &self.responses
    }

    /// Payload schema declared for `status`, if any.
    #[must_use]
    pub fn response_schema(&self, status: u16) -> Option<&Schema> {
        self.responses.get(&status)?.schema.as_ref()
    }

    /// Tags for grouping.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Builder for [`Operation`].
#[derive(Debug)]
#[must_use]
pub struct OperationBuilder {
    id: OperationId,
    method: Method,
    path: String,
    summary: Option<String>,
    parameters: Vec<Parameter>,
    responses: BTreeMap<u16, ResponseSpec>,
    tags: Vec<String>,
}

impl OperationBuilder {
    fn new(id: impl Into<OperationId>) -> Self {
        Self {
            id: id.into(),
            method: Method::GET,
            path: "/".to_string(),
            summary: None,
            parameters: Vec::new(),
            responses: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// Sets the HTTP method (default `GET`).
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path template (default `/`).
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Adds a parameter.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declares the response for `status`.
    pub fn response(mut self, status: u16, response: ResponseSpec) -> Self {
        self.responses.insert(status, response);
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Finishes the operation.
    #[must_use]
    pub fn build(self) -> Operation {
        Operation {
            id: self.id,
            method: self.method,
            path: self.path,
            summary: self.summary,
            parameters: self.parameters,
            responses: self.responses,
            tags: self.tags,
        }
    }
}

/// Operations grouped by method, then by path template.
pub type OperationsView = IndexMap<Method, IndexMap<String, Arc<Operation>>>;

/// Supplies the normalized operation view a router is built from.
pub trait OperationSource {
    /// Prefix every operation path is mounted under.
    fn base_path(&self) -> &str;

    /// Method → path → operation view.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractError`] when the contract cannot be analyzed.
    fn operations(&self) -> Result<OperationsView, ContractError>;
}

/// In-memory API contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(default, rename = "basePath")]
    base_path: String,
    #[serde(default)]
    operations: Vec<Operation>,
}

impl Contract {
    /// Starts building a contract.
    #[must_use]
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// Declared operations in declaration order.
    #[must_use]
    pub fn operation_list(&self) -> &[Operation] {
        &self.operations
    }

    /// Finds an operation by id.
    #[must_use]
    pub fn operation(&self, id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id.as_str() == id)
    }
}

impl OperationSource for Contract {
    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn operations(&self) -> Result<OperationsView, ContractError> {
        let mut view = OperationsView::new();
        let mut ids = HashSet::new();

        for op in &self.operations {
            if !ids.insert(op.id.as_str()) {
                return Err(ContractError::DuplicateOperationId(op.id.to_string()));
            }
            check_operation(op)?;

            let paths = view.entry(op.method.clone()).or_default();
            if let Some(first) = paths.get(&op.path) {
                return Err(ContractError::DuplicateRoute {
                    method: op.method.clone(),
                    path: op.path.clone(),
                    first: first.id.to_string(),
                    second: op.id.to_string(),
                });
            }
            paths.insert(op.path.clone(), Arc::new(op.clone()));
        }

        Ok(view)
    }
}

fn check_operation(op: &Operation) -> Result<(), ContractError> {
    if !op.path.starts_with('/') {
        return Err(ContractError::InvalidPath {
            operation_id: op.id.to_string(),
            path: op.path.clone(),
        });
    }

    let mut seen = HashSet::new();
    for param in &op.parameters {
        if !seen.insert((param.name.as_str(), param.location)) {
            return Err(ContractError::DuplicateParameter {
                operation_id: op.id.to_string(),
                name: param.name.clone(),
                location: param.location,
            });
        }
        match param.location {
            ParamLocation::Body if param.schema.is_none() => {
                return Err(ContractError::MissingBodySchema {
                    operation_id: op.id.to_string(),
                    name: param.name.clone(),
                });
            }
            ParamLocation::Body => {}
            _ if param.param_type.is_none() => {
                return Err(ContractError::MissingParameterType {
                    operation_id: op.id.to_string(),
                    name: param.name.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Builder for [`Contract`].
#[derive(Debug, Default)]
#[must_use]
pub struct ContractBuilder {
    base_path: String,
    operations: Vec<Operation>,
}

impl ContractBuilder {
    /// Sets the base path (default empty, i.e. the root).
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Adds an operation.
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Finishes the contract.
    #[must_use]
    pub fn build(self) -> Contract {
        Contract {
            base_path: self.base_path,
            operations: self.operations,
        }
    }
}

mod http_method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(method: &Method, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Method, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.to_ascii_uppercase()
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
