//! Pipeline values and the standard conversion table.
//!
//! Handlers exchange [`PipelineItem`]s: a tagged value plus an error flag.
//! Conversions cover string↔number, string↔boolean, and identity; they are
//! the only coercions binding performs, replacing the reflection-driven
//! converters of object shells with an explicit table.

use std::fmt;

/// A value flowing between pipeline stages.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Named properties in insertion order; lookup is case-insensitive.
    Record(Vec<(String, Value)>),
}

impl Value {
    pub fn str(text: impl Into<String>) -> Value {
        Value::Str(text.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Display conversion used for console output and sub-expression
    /// substitution. Deterministic: lists join with single spaces, records
    /// as `name=value` pairs.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(" "),
            Value::Record(fields) => fields
                .iter()
                .map(|(name, value)| format!("{name}={}", value.to_text()))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Case-insensitive property lookup on records.
    pub fn property(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields
                .iter()
                .find(|(field, _)| field.eq_ignore_ascii_case(name) || field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// One unit of flow between stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineItem {
    pub value: Value,
    pub is_error: bool,
}

impl PipelineItem {
    pub fn output(value: Value) -> Self {
        PipelineItem {
            value,
            is_error: false,
        }
    }

    pub fn error(value: Value) -> Self {
        PipelineItem {
            value,
            is_error: true,
        }
    }
}

/// Declared parameter types the binder can convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Bool,
    Int,
    Float,
    Str,
    /// Array parameter: consumes all remaining positional arguments.
    StrList,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            ParamType::Any => "any",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Str => "string",
            ParamType::StrList => "string[]",
        }
    }
}

/// Conversion failure; binding wraps this into a `ShellError::Binding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    pub from: &'static str,
    pub to: &'static str,
    pub text: String,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert {} {:?} to {}", self.from, self.text, self.to)
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

/// Standard converter table. Identity for assignable values, parse-based
/// string↔number and string↔bool, best-effort numeric widening.
pub fn convert(value: &Value, ty: ParamType) -> Result<Value, ConvertError> {
    let fail = || ConvertError {
        from: value.type_name(),
        to: ty.name(),
        text: value.to_text(),
    };
    match ty {
        ParamType::Any => Ok(value.clone()),
        ParamType::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Str(s) => parse_bool(s).map(Value::Bool).ok_or_else(fail),
            Value::Int(i) => Ok(Value::Bool(*i != 0)),
            _ => Err(fail()),
        },
        ParamType::Int => match value {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Float(f) if f.fract() == 0.0 => Ok(Value::Int(*f as i64)),
            Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| fail()),
            _ => Err(fail()),
        },
        ParamType::Float => match value {
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Str(s) => s.trim().parse().map(Value::Float).map_err(|_| fail()),
            _ => Err(fail()),
        },
        ParamType::Str => Ok(Value::Str(value.to_text())),
        ParamType::StrList => match value {
            Value::List(items) => Ok(Value::List(
                items.iter().map(|v| Value::Str(v.to_text())).collect(),
            )),
            other => Ok(Value::List(vec![Value::Str(other.to_text())])),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_conversion_is_deterministic() {
        assert_eq!(Value::str("abc").to_text(), "abc");
        assert_eq!(Value::Int(-4).to_text(), "-4");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::str("b")]).to_text(),
            "1 b"
        );
        assert_eq!(
            Value::Record(vec![("name".into(), Value::str("a.txt"))]).to_text(),
            "name=a.txt"
        );
        assert_eq!(Value::Null.to_text(), "");
    }

    #[test]
    fn record_property_lookup_is_case_insensitive() {
        let record = Value::Record(vec![("Name".into(), Value::str("x"))]);
        assert_eq!(record.property("name"), Some(&Value::str("x")));
        assert_eq!(record.property("size"), None);
        assert_eq!(Value::Int(1).property("name"), None);
    }

    #[test]
    fn string_number_conversions() {
        assert_eq!(convert(&Value::str("42"), ParamType::Int), Ok(Value::Int(42)));
        assert_eq!(
            convert(&Value::str(" 2.5 "), ParamType::Float),
            Ok(Value::Float(2.5))
        );
        assert_eq!(convert(&Value::Int(7), ParamType::Str), Ok(Value::str("7")));
        assert!(convert(&Value::str("abc"), ParamType::Int).is_err());
    }

    #[test]
    fn bool_conversions() {
        assert_eq!(
            convert(&Value::str("True"), ParamType::Bool),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            convert(&Value::str("0"), ParamType::Bool),
            Ok(Value::Bool(false))
        );
        assert!(convert(&Value::str("نعم"), ParamType::Bool).is_err());
    }

    #[test]
    fn list_conversion_wraps_scalars() {
        assert_eq!(
            convert(&Value::str("x"), ParamType::StrList),
            Ok(Value::List(vec![Value::str("x")]))
        );
        assert_eq!(
            convert(
                &Value::List(vec![Value::Int(1), Value::Int(2)]),
                ParamType::StrList
            ),
            Ok(Value::List(vec![Value::str("1"), Value::str("2")]))
        );
    }
}
