//! Conversion of raw parameter strings into typed values.
//!
//! | type      | format             | result      |
//! |-----------|--------------------|-------------|
//! | `string`  | (empty)            | [`TypedValue::String`] |
//! | `integer` | `int32`            | [`TypedValue::Int32`]  |
//! | `integer` | (empty), `int64`   | [`TypedValue::Int64`]  |
//! | `number`  | `float`            | [`TypedValue::Float`]  |
//! | `number`  | (empty), `double`  | [`TypedValue::Double`] |
//! | `boolean` | any                | [`TypedValue::Boolean`] |
//!
//! Every other combination is a [`ConversionError`]. String sub-formats
//! (`byte`, `binary`, `date`, `date-time`) and the `array`/`file` types are
//! not converted.

use std::fmt;

use serde_json::Value;

use crate::contract::ParamType;
use crate::error::ConversionError;

/// Inputs (compared case-insensitively) that convert to `true`.
const TRUTHY: [&str; 10] = [
    "true", "1", "yes", "ok", "y", "on", "selected", "checked", "t", "enabled",
];

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// `string`
    String(String),
    /// `integer` / `int32`
    Int32(i32),
    /// `integer` / `int64`
    Int64(i64),
    /// `number` / `float`
    Float(f32),
    /// `number` / `double`
    Double(f64),
    /// `boolean`
    Boolean(bool),
}

impl TypedValue {
    /// String content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content widened to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(n) => Some(i64::from(*n)),
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric content widened to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(f64::from(*n)),
            Self::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean content.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int32(n) => write!(f, "{n}"),
            Self::Int64(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Double(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<TypedValue> for Value {
    fn from(value: TypedValue) -> Self {
        match value {
            TypedValue::String(s) => Value::String(s),
            TypedValue::Int32(n) => Value::from(n),
            TypedValue::Int64(n) => Value::from(n),
            TypedValue::Float(n) => Value::from(f64::from(n)),
            TypedValue::Double(n) => Value::from(n),
            TypedValue::Boolean(b) => Value::Bool(b),
        }
    }
}

/// Converts one raw value according to its declared type and format.
///
/// # Errors
///
/// Returns a [`ConversionError`] for unsupported types or formats and for
/// values that do not parse. Boolean conversion never fails.
///
/// # Example
///
/// ```
/// use daedalus_core::{convert_primitive, ParamType, TypedValue};
///
/// assert_eq!(convert_primitive("12", ParamType::Integer, ""), Ok(TypedValue::Int64(12)));
/// assert_eq!(convert_primitive("On", ParamType::Boolean, ""), Ok(TypedValue::Boolean(true)));
/// assert!(convert_primitive("x", ParamType::Integer, "int32").is_err());
/// ```
pub fn convert_primitive(
    value: &str,
    param_type: ParamType,
    format: &str,
) -> Result<TypedValue, ConversionError> {
    match param_type {
        ParamType::String => match format {
            "" => Ok(TypedValue::String(value.to_string())),
            _ => Err(unsupported_format(param_type, format)),
        },
        ParamType::Integer => match format {
            "int32" => value
                .parse::<i32>()
                .map(TypedValue::Int32)
                .map_err(|_| invalid(value, "int32")),
            "" | "int64" => value
                .parse::<i64>()
                .map(TypedValue::Int64)
                .map_err(|_| invalid(value, "int64")),
            _ => Err(unsupported_format(param_type, format)),
        },
        ParamType::Number => match format {
            "float" => parse_float(value)
                .and_then(narrow_to_f32)
                .map(TypedValue::Float)
                .ok_or_else(|| invalid(value, "float")),
            "" | "double" => parse_float(value)
                .map(TypedValue::Double)
                .ok_or_else(|| invalid(value, "double")),
            _ => Err(unsupported_format(param_type, format)),
        },
        ParamType::Boolean => Ok(TypedValue::Boolean(is_truthy(value))),
        ParamType::Array | ParamType::File => Err(ConversionError::UnsupportedType(param_type)),
    }
}

/// Converts the values supplied for one parameter.
///
/// `array` and `file` are rejected before the values are inspected; every
/// other type requires exactly one value.
///
/// # Errors
///
/// Returns [`ConversionError::UnsupportedType`], [`ConversionError::Arity`],
/// or whatever [`convert_primitive`] reports for the single value.
pub fn convert_parameter<S: AsRef<str>>(
    values: &[S],
    param_type: ParamType,
    format: &str,
) -> Result<TypedValue, ConversionError> {
    if matches!(param_type, ParamType::Array | ParamType::File) {
        return Err(ConversionError::UnsupportedType(param_type));
    }
    match values {
        [single] => convert_primitive(single.as_ref(), param_type, format),
        _ => Err(ConversionError::Arity {
            count: values.len(),
        }),
    }
}

fn is_truthy(value: &str) -> bool {
    let lowered = value.to_lowercase();
    TRUTHY.contains(&lowered.as_str())
}

/// Parses a float, rejecting finite inputs that overflow to infinity.
fn parse_float(value: &str) -> Option<f64> {
    let parsed = value.parse::<f64>().ok()?;
    if parsed.is_infinite() && !names_infinity(value) {
        return None;
    }
    Some(parsed)
}

#[allow(clippy::cast_possible_truncation)]
fn narrow_to_f32(value: f64) -> Option<f32> {
    let narrowed = value as f32;
    if narrowed.is_infinite() && value.is_finite() {
        return None;
    }
    Some(narrowed)
}

fn names_infinity(value: &str) -> bool {
    value
        .trim_start_matches(['+', '-'])
        .to_ascii_lowercase()
        .starts_with("inf")
}

fn unsupported_format(param_type: ParamType, format: &str) -> ConversionError {
    ConversionError::UnsupportedFormat {
        param_type,
        format: format.to_string(),
    }
}

fn invalid(value: &str, target: &'static str) -> ConversionError {
    ConversionError::InvalidValue {
        value: value.to_string(),
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_string_conversion() {
        assert_eq!(
            convert_primitive("doggie", ParamType::String, ""),
            Ok(TypedValue::String("doggie".to_string()))
        );
        for format in ["byte", "binary", "date", "date-time", "password"] {
            assert_eq!(
                convert_primitive("x", ParamType::String, format),
                Err(unsupported_format(ParamType::String, format))
            );
        }
    }

    #[test]
    fn test_integer_conversion() {
        assert_eq!(convert_primitive("42", ParamType::Integer, "int32"), Ok(TypedValue::Int32(42)));
        assert_eq!(convert_primitive("-7", ParamType::Integer, ""), Ok(TypedValue::Int64(-7)));
        assert_eq!(
            convert_primitive("9223372036854775807", ParamType::Integer, "int64"),
            Ok(TypedValue::Int64(i64::MAX))
        );
        assert_eq!(
            convert_primitive("2147483648", ParamType::Integer, "int32"),
            Err(invalid("2147483648", "int32"))
        );
        assert_eq!(convert_primitive("abc", ParamType::Integer, ""), Err(invalid("abc", "int64")));
        assert_eq!(convert_primitive("1.5", ParamType::Integer, "int64"), Err(invalid("1.5", "int64")));
        assert_eq!(convert_primitive("", ParamType::Integer, ""), Err(invalid("", "int64")));
        assert_eq!(
            convert_primitive("1", ParamType::Integer, "uint8"),
            Err(unsupported_format(ParamType::Integer, "uint8"))
        );
    }

    #[test]
    fn test_number_conversion() {
        assert_eq!(convert_primitive("1.5", ParamType::Number, "float"), Ok(TypedValue::Float(1.5)));
        assert_eq!(convert_primitive("2.25", ParamType::Number, ""), Ok(TypedValue::Double(2.25)));
        assert_eq!(convert_primitive("3", ParamType::Number, "double"), Ok(TypedValue::Double(3.0)));
        assert_eq!(convert_primitive("1e40", ParamType::Number, "float"), Err(invalid("1e40", "float")));
        assert_eq!(convert_primitive("1e400", ParamType::Number, ""), Err(invalid("1e400", "double")));
        assert_eq!(
            convert_primitive("-inf", ParamType::Number, ""),
            Ok(TypedValue::Double(f64::NEG_INFINITY))
        );
        assert_eq!(convert_primitive("one", ParamType::Number, ""), Err(invalid("one", "double")));
        assert_eq!(
            convert_primitive("1", ParamType::Number, "decimal"),
            Err(unsupported_format(ParamType::Number, "decimal"))
        );
    }

    #[test]
    fn test_boolean_conversion() {
        for truthy in ["true", "TRUE", "1", "yes", "Ok", "y", "ON", "selected", "Checked", "t", "enabled"] {
            assert_eq!(
                convert_primitive(truthy, ParamType::Boolean, ""),
                Ok(TypedValue::Boolean(true)),
                "{truthy}"
            );
        }
        for falsy in ["false", "0", "no", "", "truthy", "disabled"] {
            assert_eq!(
                convert_primitive(falsy, ParamType::Boolean, ""),
                Ok(TypedValue::Boolean(false)),
                "{falsy}"
            );
        }
    }

    #[test]
    fn test_unsupported_types() {
        assert_eq!(
            convert_primitive("a,b", ParamType::Array, ""),
            Err(ConversionError::UnsupportedType(ParamType::Array))
        );
        assert_eq!(
            convert_primitive("blob", ParamType::File, ""),
            Err(ConversionError::UnsupportedType(ParamType::File))
        );
    }

    #[test]
    fn test_convert_parameter_arity() {
        assert_eq!(convert_parameter(&["5"], ParamType::Integer, ""), Ok(TypedValue::Int64(5)));
        assert_eq!(
            convert_parameter::<&str>(&[], ParamType::Integer, ""),
            Err(ConversionError::Arity { count: 0 })
        );
        assert_eq!(
            convert_parameter(&["1", "2"], ParamType::Boolean, ""),
            Err(ConversionError::Arity { count: 2 })
        );
    }

    #[test]
    fn test_convert_parameter_rejects_array_before_arity() {
        assert_eq!(
            convert_parameter(&["1", "2"], ParamType::Array, ""),
            Err(ConversionError::UnsupportedType(ParamType::Array))
        );
    }

    #[test]
    fn test_typed_value_accessors() {
        assert_eq!(TypedValue::Int32(3).as_i64(), Some(3));
        assert_eq!(TypedValue::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(TypedValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(TypedValue::String("a".into()).as_str(), Some("a"));
        assert_eq!(TypedValue::Int64(1).as_str(), None);
        assert_eq!(Value::from(TypedValue::Int64(12)), serde_json::json!(12));
        assert_eq!(TypedValue::Double(1.5).to_string(), "1.5");
    }

    proptest! {
        #[test]
        fn prop_boolean_conversion_is_total(value in ".*", format in "[a-z0-9-]{0,8}") {
            let converted = convert_primitive(&value, ParamType::Boolean, &format);
            prop_assert!(matches!(converted, Ok(TypedValue::Boolean(_))));
        }

        #[test]
        fn prop_int64_round_trip(n in any::<i64>()) {
            prop_assert_eq!(
                convert_primitive(&n.to_string(), ParamType::Integer, "int64"),
                Ok(TypedValue::Int64(n))
            );
        }

        #[test]
        fn prop_conversion_never_panics(value in ".*", format in ".{0,10}") {
            for param_type in [
                ParamType::String,
                ParamType::Integer,
                ParamType::Number,
                ParamType::Boolean,
                ParamType::Array,
                ParamType::File,
            ] {
                let _ = convert_primitive(&value, param_type, &format);
            }
        }
    }
}
