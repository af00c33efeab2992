//! Comparison values and their coercion to column types.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ColumnType;

/// A scalar (or list of scalars) compared against an expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }

    /// Convert a raw value into the representation stored for `ty`.
    ///
    /// Lists are coerced element-wise; `Null` passes through unchanged.
    pub fn coerce(self, ty: ColumnType) -> Result<Value, String> {
        match self {
            Value::Null => Ok(Value::Null),
            Value::List(items) => items
                .into_iter()
                .map(|v| v.coerce(ty))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            scalar => coerce_scalar(scalar, ty),
        }
    }
}

fn coerce_scalar(v: Value, ty: ColumnType) -> Result<Value, String> {
    match (ty, v) {
        (ColumnType::Text, Value::Text(s)) => Ok(Value::Text(s)),
        (ColumnType::Text, other) => Ok(Value::Text(other.to_string())),

        (ColumnType::Integer, Value::Integer(i)) => Ok(Value::Integer(i)),
        (ColumnType::Integer, Value::Bool(b)) => Ok(Value::Integer(b as i64)),
        (ColumnType::Integer, Value::Real(f))
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
        {
            Ok(Value::Integer(f as i64))
        }
        (ColumnType::Integer, Value::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| format!("{s:?} is not an integer")),

        (ColumnType::Real, Value::Real(f)) => Ok(Value::Real(f)),
        (ColumnType::Real, Value::Integer(i)) => Ok(Value::Real(i as f64)),
        (ColumnType::Real, Value::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| format!("{s:?} is not a number")),

        (ColumnType::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ColumnType::Boolean, Value::Integer(0)) => Ok(Value::Bool(false)),
        (ColumnType::Boolean, Value::Integer(1)) => Ok(Value::Bool(true)),
        (ColumnType::Boolean, Value::Text(s)) => parse_bool(&s)
            .map(Value::Bool)
            .ok_or_else(|| format!("{s:?} is not a boolean")),

        // Timestamps are compared in whatever form the store keeps them.
        (ColumnType::Timestamp, v @ (Value::Text(_) | Value::Integer(_))) => Ok(v),

        (ty, v) => Err(format!("cannot use {} value as {}", v.type_name(), ty.as_str())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
