//! Dynamic values produced by condition expressions and host tables
//!
//! Values follow script semantics rather than Rust ones: `0`, `""`, `null`
//! and `NaN` are falsy, numeric strings coerce to numbers, and strings print
//! without quotes so they can be spliced back into note text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property bag of a unit or a map literal, in insertion order
pub type ValueMap = IndexMap<String, Value>;

/// A dynamic value as seen by condition scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    /// `null` / `undefined`
    #[default]
    Null,
    Bool(bool),
    /// Switch ids, variable values, HP and other whole numbers
    Int(i64),
    /// Rates and results of non-integral arithmetic
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    /// A number, stored as `Int` when it has no fractional part
    pub fn number(n: f64) -> Value {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
            Value::Int(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Whole-number view; integral floats are accepted
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Int(i) => Some(i as f64),
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric coercion used by arithmetic and ordering
    ///
    /// Booleans become 0/1, null and blank strings become 0, other strings
    /// must parse as a number. Lists and maps have no numeric value.
    pub fn to_number(&self) -> Option<Value> {
        match self {
            Value::Int(_) | Value::Float(_) => Some(self.clone()),
            Value::Bool(b) => Some(Value::Int(i64::from(*b))),
            Value::Null => Some(Value::Int(0)),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    Some(Value::Int(0))
                } else {
                    s.parse::<i64>()
                        .map(Value::Int)
                        .or_else(|_| s.parse::<f64>().map(Value::Float))
                        .ok()
                }
            }
            Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Name used in type errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => !(*f == 0.0 || f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => b.fmt(f),
            Value::Int(i) => i.fmt(f),
            Value::Float(n) => n.fmt(f),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                let mut sep = "";
                for item in items {
                    write!(f, "{sep}{item}")?;
                    sep = ",";
                }
                Ok(())
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                let mut sep = "";
                for (key, value) in entries {
                    write!(f, "{sep}{key}: {value}")?;
                    sep = ", ";
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(n: $ty) -> Self {
                Value::Int(i64::from(n))
            }
        })*
    };
}

impl_from_int!(i32, i64, u32);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_normalizes_integral_floats() {
        assert_eq!(Value::number(3.0), Value::Int(3));
        assert_eq!(Value::number(0.25), Value::Float(0.25));
        assert!(matches!(Value::number(f64::INFINITY), Value::Float(_)));
        assert_eq!(Value::Float(3.0).as_int(), Some(3));
        assert_eq!(Value::Float(3.5).as_int(), None);
    }

    #[test]
    fn test_to_number_coercion() {
        assert_eq!(Value::Bool(true).to_number(), Some(Value::Int(1)));
        assert_eq!(Value::Null.to_number(), Some(Value::Int(0)));
        assert_eq!(Value::from(" 12 ").to_number(), Some(Value::Int(12)));
        assert_eq!(Value::from("0.5").to_number(), Some(Value::Float(0.5)));
        assert_eq!(Value::from("").to_number(), Some(Value::Int(0)));
        assert_eq!(Value::from("Harold").to_number(), None);
        assert_eq!(Value::from(vec![1i64]).to_number(), None);
    }

    #[test]
    fn test_value_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(f64::NAN).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::String("0".into()).is_truthy());
    }

    #[test]
    fn test_display_is_unquoted() {
        assert_eq!(Value::from("Harold").to_string(), "Harold");
        assert_eq!(Value::from(vec![1i64, 2]).to_string(), "1,2");
        let mut map = ValueMap::new();
        map.insert("hp".into(), Value::Int(3));
        assert_eq!(Value::Map(map).to_string(), "{hp: 3}");
    }
}
