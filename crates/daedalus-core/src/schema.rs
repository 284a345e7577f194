//! Payload schemas and validation.
//!
//! [`Schema`] covers the JSON shapes a contract declares for request and
//! response payloads. Validation goes through the [`SchemaValidator`] trait
//! so a full JSON-Schema engine can be swapped in; [`BasicSchemaValidator`]
//! evaluates [`Schema`] directly and reports every violation it finds.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema of a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
    /// JSON string.
    String {
        /// Minimum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// JSON number without a fractional part.
    Integer {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// Any JSON number.
    Number {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// JSON boolean.
    Boolean,
    /// JSON array with homogeneous items.
    Array {
        /// Item schema.
        items: Box<Schema>,
        /// Minimum number of items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum number of items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// JSON object.
    Object {
        /// Known properties.
        #[serde(default)]
        properties: IndexMap<String, Schema>,
        /// Properties that must be present.
        #[serde(default)]
        required: Vec<String>,
    },
    /// Accepts any value, including null.
    Any,
    /// Accepts only null.
    Null,
}

impl Schema {
    /// A string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            min_length: None,
            max_length: None,
        }
    }

    /// An integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::Integer {
            minimum: None,
            maximum: None,
        }
    }

    /// A number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::Number {
            minimum: None,
            maximum: None,
        }
    }

    /// A boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean
    }

    /// An array schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// An object schema with the given properties, none of them required.
    #[must_use]
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        Self::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required: Vec::new(),
        }
    }

    /// A schema accepting anything.
    #[must_use]
    pub fn any() -> Self {
        Self::Any
    }

    /// A schema accepting only null.
    #[must_use]
    pub fn null() -> Self {
        Self::Null
    }

    /// Marks object properties as required. No effect on other schemas.
    #[must_use]
    pub fn require<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Self::Object { required, .. } = &mut self {
            required.extend(names.into_iter().map(Into::into));
        }
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let Self::String { min_length, .. } = &mut self {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let Self::String { max_length, .. } = &mut self {
            *max_length = Some(len);
        }
        self
    }

    /// Sets the integer range.
    #[must_use]
    pub fn int_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if let Self::Integer { minimum, maximum } = &mut self {
            *minimum = min;
            *maximum = max;
        }
        self
    }

    /// Sets the number range.
    #[must_use]
    pub fn number_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        if let Self::Number { minimum, maximum } = &mut self {
            *minimum = min;
            *maximum = max;
        }
        self
    }

    /// Sets the array length bounds.
    #[must_use]
    pub fn items_range(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        if let Self::Array {
            min_items, max_items, ..
        } = &mut self
        {
            *min_items = min;
            *max_items = max;
        }
        self
    }
}

/// A single schema mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON path of the offending value, rooted at `$`.
    pub path: String,
    /// What was wrong.
    pub message: String,
}

impl SchemaViolation {
    /// Creates a violation.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error at '{}': {}", self.path, self.message)
    }
}

impl std::error::Error for SchemaViolation {}

/// Checks a decoded payload against a schema.
pub trait SchemaValidator: Send + Sync + 'static {
    /// Returns every violation; an empty list means the value is valid.
    fn validate(&self, schema: &Schema, value: &Value) -> Vec<SchemaViolation>;
}

/// Evaluates [`Schema`] directly.
///
/// Only the keywords [`Schema`] models are checked: type, required
/// properties, string length, numeric bounds and array size. Other
/// JSON-Schema keywords such as `enum`, `format`, `additionalProperties`
/// and `$ref` are dropped when a schema is deserialized and never
/// evaluated, so properties not listed in an object schema are accepted.
/// Contracts that depend on those keywords need a full JSON-Schema engine
/// behind [`SchemaValidator`].
///
/// ```
/// use daedalus_core::schema::{BasicSchemaValidator, Schema, SchemaValidator};
/// use serde_json::json;
///
/// let pet = Schema::object(vec![("name", Schema::string()), ("age", Schema::integer())])
///     .require(["name"]);
/// let violations = BasicSchemaValidator.validate(&pet, &json!({"age": "old"}));
/// assert_eq!(violations.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSchemaValidator;

impl SchemaValidator for BasicSchemaValidator {
    fn validate(&self, schema: &Schema, value: &Value) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        check(schema, value, "$", &mut violations);
        violations
    }
}

fn check(schema: &Schema, value: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    let mismatch = |expected: &str| {
        SchemaViolation::new(
            path,
            format!("expected {expected}, got {}", value_type_name(value)),
        )
    };

    match schema {
        Schema::Any => {}
        Schema::Null => {
            if !value.is_null() {
                out.push(mismatch("null"));
            }
        }
        Schema::Boolean => {
            if !value.is_boolean() {
                out.push(mismatch("boolean"));
            }
        }
        Schema::String {
            min_length,
            max_length,
        } => {
            let Some(s) = value.as_str() else {
                out.push(mismatch("string"));
                return;
            };
            let len = s.chars().count();
            if let Some(min) = min_length.filter(|min| len < *min) {
                out.push(SchemaViolation::new(
                    path,
                    format!("string length {len} is less than minimum {min}"),
                ));
            }
            if let Some(max) = max_length.filter(|max| len > *max) {
                out.push(SchemaViolation::new(
                    path,
                    format!("string length {len} is greater than maximum {max}"),
                ));
            }
        }
        Schema::Integer { minimum, maximum } => {
            let Some(n) = value.as_i64() else {
                out.push(mismatch("integer"));
                return;
            };
            if let Some(min) = minimum.filter(|min| n < *min) {
                out.push(SchemaViolation::new(
                    path,
                    format!("value {n} is less than minimum {min}"),
                ));
            }
            if let Some(max) = maximum.filter(|max| n > *max) {
                out.push(SchemaViolation::new(
                    path,
                    format!("value {n} is greater than maximum {max}"),
                ));
            }
        }
        Schema::Number { minimum, maximum } => {
            let Some(n) = value.as_f64() else {
                out.push(mismatch("number"));
                return;
            };
            if let Some(min) = minimum.filter(|min| n < *min) {
                out.push(SchemaViolation::new(
                    path,
                    format!("value {n} is less than minimum {min}"),
                ));
            }
            if let Some(max) = maximum.filter(|max| n > *max) {
                out.push(SchemaViolation::new(
                    path,
                    format!("value {n} is greater than maximum {max}"),
                ));
            }
        }
        Schema::Array {
            items,
            min_items,
            max_items,
        } => {
            let Some(arr) = value.as_array() else {
                out.push(mismatch("array"));
                return;
            };
            if let Some(min) = min_items.filter(|min| arr.len() < *min) {
                out.push(SchemaViolation::new(
                    path,
                    format!("array length {} is less than minimum {min}", arr.len()),
                ));
            }
            if let Some(max) = max_items.filter(|max| arr.len() > *max) {
                out.push(SchemaViolation::new(
                    path,
                    format!("array length {} is greater than maximum {max}", arr.len()),
                ));
            }
            for (idx, item) in arr.iter().enumerate() {
                check(items, item, &format!("{path}[{idx}]"), out);
            }
        }
        Schema::Object {
            properties,
            required,
        } => {
            let Some(obj) = value.as_object() else {
                out.push(mismatch("object"));
                return;
            };
            for name in required {
                if !obj.contains_key(name) {
                    out.push(SchemaViolation::new(
                        format!("{path}.{name}"),
                        format!("missing required property '{name}'"),
                    ));
                }
            }
            for (name, prop_schema) in properties {
                if let Some(prop_value) = obj.get(name) {
                    check(prop_schema, prop_value, &format!("{path}.{name}"), out);
                }
            }
        }
    }
}

/// Human-readable name of a JSON value's type.
fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
