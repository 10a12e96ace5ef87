//! Dynamically-typed attribute values

use std::fmt;

use crate::types::PrimitiveType;

/// A scalar attribute value tagged with its kind
///
/// `Double` compares by bit pattern so values stay `Eq`; `-0.0` and `0.0` are
/// therefore distinct, which keeps round-trips exact.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    String(String),
    Long(i64),
    Int(i32),
    Boolean(bool),
    Double(f64),
    Null,
}

impl AttributeValue {
    /// The primitive type carried by this value, `None` for `Null`
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self {
            AttributeValue::String(_) => Some(PrimitiveType::String),
            AttributeValue::Long(_) => Some(PrimitiveType::Long),
            AttributeValue::Int(_) => Some(PrimitiveType::Int),
            AttributeValue::Boolean(_) => Some(PrimitiveType::Boolean),
            AttributeValue::Double(_) => Some(PrimitiveType::Double),
            AttributeValue::Null => None,
        }
    }

    /// Name of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        self.primitive_type().map(|t| t.name()).unwrap_or("null")
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Whether this value may be stored in an attribute of `expected` type
    pub fn conforms_to(&self, expected: PrimitiveType) -> bool {
        match self.primitive_type() {
            Some(actual) => actual == expected,
            None => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::String(a), AttributeValue::String(b)) => a == b,
            (AttributeValue::Long(a), AttributeValue::Long(b)) => a == b,
            (AttributeValue::Int(a), AttributeValue::Int(b)) => a == b,
            (AttributeValue::Boolean(a), AttributeValue::Boolean(b)) => a == b,
            (AttributeValue::Double(a), AttributeValue::Double(b)) => a.to_bits() == b.to_bits(),
            (AttributeValue::Null, AttributeValue::Null) => true,
            _ => false,
        }
    }
}

impl Eq for AttributeValue {}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{:?}", s),
            AttributeValue::Long(v) => write!(f, "{}L", v),
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Boolean(v) => write!(f, "{}", v),
            AttributeValue::Double(v) => write!(f, "{:?}", v),
            AttributeValue::Null => f.write_str("null"),
        }
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Long(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Boolean(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Double(v)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(AttributeValue::Null)
    }
}
