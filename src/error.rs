//! Error types for the entity catalog

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Entity catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Type mismatch for attribute '{attribute}': expected {expected}, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("Attribute '{attribute}' is not declared by type {type_name}")]
    UnknownAttribute { type_name: String, attribute: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Schema conflict: type {type_name} is already registered with a different attribute set")]
    SchemaConflict { type_name: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err.to_string())
    }
}

impl CatalogError {
    pub(crate) fn type_mismatch(
        attribute: impl Into<String>,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        CatalogError::TypeMismatch {
            attribute: attribute.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn not_found(kind: &str, id: impl ToString) -> Self {
        CatalogError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}
