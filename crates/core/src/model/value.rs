use std::fmt;

use serde::Serialize;

/// A scalar attached to a property node.
///
/// Nested structure is expressed through child nodes, never through the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    /// Values that do not fit an `i64`, e.g. nanosecond timestamps read as
    /// unsigned 64-bit integers.
    BigInt(i128),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::BigInt(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            Self::Bool(_) | Self::String(_) => None,
        }
    }

    /// Integer view of the value. Floats qualify only when they carry no
    /// fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::BigInt(v) => i64::try_from(v).ok(),
            Self::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i128> for PropertyValue {
    fn from(v: i128) -> Self {
        Self::BigInt(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Where a property's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PropertySource {
    /// Read from the trace.
    #[default]
    Proto,
    /// Filled in because the trace left the field unset.
    Default,
    /// Derived by a computation pass.
    Calculated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_views() {
        assert_eq!(PropertyValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(PropertyValue::Float(2.0).as_i64(), Some(2));
        assert_eq!(PropertyValue::Float(2.5).as_i64(), None);
        assert_eq!(PropertyValue::BigInt(1 << 70).as_i64(), None);
        assert_eq!(PropertyValue::from("x").as_f64(), None);
        assert_eq!(PropertyValue::Bool(true).as_bool(), Some(true));
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(PropertyValue::Float(1.5).to_string(), "1.5");
        assert_eq!(PropertyValue::Int(-7).to_string(), "-7");
        assert_eq!(PropertyValue::from("Display 0").to_string(), "Display 0");
    }
}
