//! Metadata catalog boundary
//!
//! The catalog itself is an external service. This module defines the narrow
//! interface the client depends on, plus two simulated backends that honor the
//! same contract: [`InMemoryCatalog`] and the file-backed [`DirectoryCatalog`].

mod directory;
mod memory;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checksum::Checksum;
use crate::error::Result;

pub use directory::DirectoryCatalog;
pub use memory::InMemoryCatalog;

/// Identifier the catalog assigns to a created entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Creates a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an entity ID from a string.
    pub fn parse(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Reference to a registered type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHandle {
    pub type_name: String,
    pub checksum: Checksum,
}

/// Operations the client needs from a metadata catalog
///
/// Calls are synchronous. Errors from the catalog (`Validation`,
/// `SchemaConflict`, `NotFound`) are surfaced to the caller as-is.
pub trait CatalogClient {
    /// Names of all registered types
    fn type_names(&self) -> Vec<String>;

    /// Register a type definition document
    ///
    /// Registering a name that already exists with the same attribute set
    /// succeeds; a different attribute set fails with `SchemaConflict`.
    fn register_type(&mut self, definition_text: &str) -> Result<TypeHandle>;

    /// Create an entity from an instance document
    ///
    /// Fails with `Validation` when a required attribute is missing or a
    /// unique attribute repeats an existing value.
    fn create_entity(&mut self, instance_text: &str) -> Result<EntityId>;

    /// Fetch the instance document of a stored entity
    fn get_entity(&self, id: &EntityId) -> Result<String>;
}
