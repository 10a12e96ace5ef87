//! In-memory simulated catalog

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{CatalogClient, EntityId, TypeHandle};
use crate::error::{CatalogError, Result};
use crate::instance::EntityInstance;
use crate::schema::EntityTypeDefinition;
use crate::serializer::{deserialize_instance, deserialize_type, peek_type_name, serialize_instance};

/// An entity held by the catalog
#[derive(Debug, Clone)]
pub(crate) struct StoredEntity {
    pub instance: EntityInstance,
    pub created_at: DateTime<Utc>,
}

/// Catalog that keeps types and entities in process memory
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    types: HashMap<String, EntityTypeDefinition>,
    entities: HashMap<EntityId, StoredEntity>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a registered definition
    pub fn definition(&self, type_name: &str) -> Option<&EntityTypeDefinition> {
        self.types.get(type_name)
    }

    /// Number of stored entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// When an entity was created
    pub fn created_at(&self, id: &EntityId) -> Option<DateTime<Utc>> {
        self.entities.get(id).map(|e| e.created_at)
    }

    /// Parse and check a definition document without registering it
    ///
    /// Returns the definition and whether it is new to the catalog.
    pub(crate) fn prepare_type(&self, definition_text: &str) -> Result<(EntityTypeDefinition, bool)> {
        let definition = deserialize_type(definition_text)?;
        match self.types.get(definition.type_name()) {
            Some(existing) if existing.is_compatible_with(&definition) => Ok((definition, false)),
            Some(_) => Err(CatalogError::SchemaConflict {
                type_name: definition.type_name().to_string(),
            }),
            None => Ok((definition, true)),
        }
    }

    pub(crate) fn commit_type(&mut self, definition: EntityTypeDefinition) -> TypeHandle {
        let handle = TypeHandle {
            type_name: definition.type_name().to_string(),
            checksum: definition.checksum(),
        };
        info!(type_name = %handle.type_name, checksum = %handle.checksum.short(), "registered type");
        self.types.insert(handle.type_name.clone(), definition);
        handle
    }

    /// Parse and validate an instance document without storing it
    pub(crate) fn prepare_entity(&self, instance_text: &str) -> Result<EntityInstance> {
        let type_name = peek_type_name(instance_text)?;
        let definition = self
            .types
            .get(&type_name)
            .ok_or_else(|| CatalogError::not_found("Type", &type_name))?;

        let instance = deserialize_instance(instance_text, definition)?;
        instance.validate_required(definition)?;
        self.check_unique(definition, &instance)?;
        Ok(instance)
    }

    pub(crate) fn commit_entity(&mut self, id: EntityId, instance: EntityInstance, created_at: DateTime<Utc>) {
        debug!(%id, type_name = instance.type_name(), "stored entity");
        self.entities.insert(id, StoredEntity { instance, created_at });
    }

    fn check_unique(&self, definition: &EntityTypeDefinition, instance: &EntityInstance) -> Result<()> {
        for attribute in definition.unique_attributes() {
            let Some(value) = instance.get(attribute.name()).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = self
                .entities
                .values()
                .filter(|e| e.instance.type_name() == definition.type_name())
                .any(|e| e.instance.get(attribute.name()) == Some(value));
            if taken {
                return Err(CatalogError::Validation(format!(
                    "{}.{} must be unique, {} is already in use",
                    definition.type_name(),
                    attribute.name(),
                    value
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn stored(&self, id: &EntityId) -> Result<&StoredEntity> {
        self.entities
            .get(id)
            .ok_or_else(|| CatalogError::not_found("Entity", id))
    }
}

impl CatalogClient for InMemoryCatalog {
    fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    fn register_type(&mut self, definition_text: &str) -> Result<TypeHandle> {
        let (definition, is_new) = self.prepare_type(definition_text)?;
        if !is_new {
            debug!(type_name = definition.type_name(), "type already registered");
            return Ok(TypeHandle {
                type_name: definition.type_name().to_string(),
                checksum: definition.checksum(),
            });
        }
        Ok(self.commit_type(definition))
    }

    fn create_entity(&mut self, instance_text: &str) -> Result<EntityId> {
        let instance = self.prepare_entity(instance_text)?;
        let id = EntityId::new();
        self.commit_entity(id, instance, Utc::now());
        Ok(id)
    }

    fn get_entity(&self, id: &EntityId) -> Result<String> {
        serialize_instance(&self.stored(id)?.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TYPE: &str = r#"{"typeName":"tests.sample","attributeDefinitions":[
        {"name":"code","dataTypeName":"string","multiplicity":"required","isComposite":false,"isUnique":true,"reverseAttributeName":null},
        {"name":"size","dataTypeName":"int","multiplicity":"optional","isComposite":false,"isUnique":false,"reverseAttributeName":null}
    ]}"#;

    #[test]
    fn test_register_is_idempotent() {
        let mut catalog = InMemoryCatalog::new();
        let first = catalog.register_type(SAMPLE_TYPE).unwrap();
        let second = catalog.register_type(SAMPLE_TYPE).unwrap();
        assert_eq!(first, second);
        assert_eq!(catalog.type_names(), vec!["tests.sample".to_string()]);
    }

    #[test]
    fn test_conflicting_registration() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_type(SAMPLE_TYPE).unwrap();
        let changed = SAMPLE_TYPE.replace("\"int\"", "\"long\"");
        let err = catalog.register_type(&changed).unwrap_err();
        assert!(matches!(err, CatalogError::SchemaConflict { type_name } if type_name == "tests.sample"));
    }

    #[test]
    fn test_create_and_get() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_type(SAMPLE_TYPE).unwrap();
        let id = catalog
            .create_entity(r#"{"typeName":"tests.sample","values":{"code":"a","size":2}}"#)
            .unwrap();
        assert_eq!(
            catalog.get_entity(&id).unwrap(),
            r#"{"typeName":"tests.sample","values":{"code":"a","size":2}}"#
        );
        assert!(catalog.created_at(&id).is_some());
    }

    #[test]
    fn test_required_and_unique_enforced() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_type(SAMPLE_TYPE).unwrap();

        let err = catalog
            .create_entity(r#"{"typeName":"tests.sample","values":{"size":2}}"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        catalog
            .create_entity(r#"{"typeName":"tests.sample","values":{"code":"a"}}"#)
            .unwrap();
        let err = catalog
            .create_entity(r#"{"typeName":"tests.sample","values":{"code":"a"}}"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(msg) if msg.contains("unique")));
        assert_eq!(catalog.entity_count(), 1);
    }

    #[test]
    fn test_unknown_type_and_entity() {
        let mut catalog = InMemoryCatalog::new();
        let err = catalog
            .create_entity(r#"{"typeName":"tests.ghost","values":{}}"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));

        let err = catalog.get_entity(&EntityId::new()).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { kind, .. } if kind == "Entity"));
    }
}
