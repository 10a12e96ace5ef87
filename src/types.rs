//! Primitive attribute types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// Scalar kind of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Long,
    Int,
    Boolean,
    Double,
}

impl PrimitiveType {
    /// All supported primitive types
    pub const ALL: [PrimitiveType; 5] = [
        PrimitiveType::String,
        PrimitiveType::Long,
        PrimitiveType::Int,
        PrimitiveType::Boolean,
        PrimitiveType::Double,
    ];

    /// Get the wire name for this type (the `dataTypeName` of an attribute)
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Long => "long",
            PrimitiveType::Int => "int",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Double => "double",
        }
    }

    /// Resolve a wire name to a primitive type
    pub fn from_name(name: &str) -> Result<Self, CatalogError> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| CatalogError::InvalidSchema(format!("unsupported data type '{}'", name)))
    }

    /// Whether values of this type are integral numbers
    pub fn is_integral(&self) -> bool {
        matches!(self, PrimitiveType::Long | PrimitiveType::Int)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
