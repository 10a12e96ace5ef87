//! Typed client over a metadata catalog
//!
//! Drives the full round trip: domain object → instance → document → catalog,
//! and back. Every call makes at most one catalog request for the entity
//! itself; nothing is retried.

use tracing::{debug, info};

use crate::catalog::{CatalogClient, EntityId, TypeHandle};
use crate::error::Result;
use crate::mapper::{from_instance, to_instance, EntityMapping};
use crate::schema::EntityTypeDefinition;
use crate::serializer::{deserialize_instance, serialize_instance, serialize_type};

/// Typed access to a [`CatalogClient`]
pub struct MetadataClient<C> {
    catalog: C,
    strict_registration: bool,
}

impl<C: CatalogClient> MetadataClient<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            strict_registration: false,
        }
    }

    /// Send every registration to the catalog, even for known type names
    ///
    /// Without this a type name already listed by the catalog is taken as
    /// registered and its attribute set is not compared.
    pub fn strict_registration(mut self, strict: bool) -> Self {
        self.strict_registration = strict;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn into_inner(self) -> C {
        self.catalog
    }

    /// Register a type definition
    ///
    /// Returns `None` when the name was already registered and the catalog was
    /// not consulted.
    pub fn register_type(&mut self, definition: &EntityTypeDefinition) -> Result<Option<TypeHandle>> {
        if !self.strict_registration
            && self
                .catalog
                .type_names()
                .iter()
                .any(|n| n == definition.type_name())
        {
            debug!(type_name = definition.type_name(), "type already registered, skipping");
            return Ok(None);
        }

        let text = serialize_type(definition)?;
        let handle = self.catalog.register_type(&text)?;
        info!(type_name = %handle.type_name, "type registered");
        Ok(Some(handle))
    }

    /// Store a domain object as an entity of `definition`
    pub fn create<T: EntityMapping>(&mut self, object: &T, definition: &EntityTypeDefinition) -> Result<EntityId> {
        let instance = to_instance(object, definition)?;
        instance.validate_required(definition)?;
        let text = serialize_instance(&instance)?;

        let id = self.catalog.create_entity(&text)?;
        info!(%id, type_name = definition.type_name(), "entity created");
        Ok(id)
    }

    /// Fetch an entity and map it back to a domain object
    pub fn get<T: EntityMapping>(&self, id: &EntityId, definition: &EntityTypeDefinition) -> Result<T> {
        let text = self.catalog.get_entity(id)?;
        let instance = deserialize_instance(&text, definition)?;
        debug!(%id, attributes = instance.values().len(), "entity fetched");
        from_instance(&instance)
    }
}
