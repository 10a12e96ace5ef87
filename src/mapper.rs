//! Mapping between typed domain objects and generic entity instances

use crate::error::{CatalogError, Result};
use crate::instance::EntityInstance;
use crate::schema::EntityTypeDefinition;
use crate::types::PrimitiveType;
use crate::value::AttributeValue;

/// A strongly-typed domain object with a fixed set of named fields
///
/// Implementations map each field to the attribute of the same name. `None`
/// fields are reported as [`AttributeValue::Null`]; [`to_instance`] drops them.
pub trait EntityMapping: Sized {
    /// Field values keyed by attribute name
    fn to_values(&self) -> Vec<(&'static str, AttributeValue)>;

    /// Rebuild the object from attribute values
    fn from_values(values: &AttributeValues<'_>) -> Result<Self>;
}

/// Typed read access to the attributes of an instance
pub struct AttributeValues<'a> {
    instance: &'a EntityInstance,
}

impl<'a> AttributeValues<'a> {
    pub fn new(instance: &'a EntityInstance) -> Self {
        Self { instance }
    }

    pub fn type_name(&self) -> &str {
        self.instance.type_name()
    }

    fn present(&self, name: &str) -> Option<&'a AttributeValue> {
        self.instance.get(name).filter(|v| !v.is_null())
    }

    fn mismatch(name: &str, expected: PrimitiveType, found: &AttributeValue) -> CatalogError {
        CatalogError::type_mismatch(name, expected, found.kind())
    }

    pub fn string(&self, name: &str) -> Result<Option<String>> {
        match self.present(name) {
            None => Ok(None),
            Some(AttributeValue::String(v)) => Ok(Some(v.clone())),
            Some(other) => Err(Self::mismatch(name, PrimitiveType::String, other)),
        }
    }

    pub fn long(&self, name: &str) -> Result<Option<i64>> {
        match self.present(name) {
            None => Ok(None),
            Some(AttributeValue::Long(v)) => Ok(Some(*v)),
            Some(other) => Err(Self::mismatch(name, PrimitiveType::Long, other)),
        }
    }

    pub fn int(&self, name: &str) -> Result<Option<i32>> {
        match self.present(name) {
            None => Ok(None),
            Some(AttributeValue::Int(v)) => Ok(Some(*v)),
            Some(other) => Err(Self::mismatch(name, PrimitiveType::Int, other)),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<Option<bool>> {
        match self.present(name) {
            None => Ok(None),
            Some(AttributeValue::Boolean(v)) => Ok(Some(*v)),
            Some(other) => Err(Self::mismatch(name, PrimitiveType::Boolean, other)),
        }
    }

    pub fn double(&self, name: &str) -> Result<Option<f64>> {
        match self.present(name) {
            None => Ok(None),
            Some(AttributeValue::Double(v)) => Ok(Some(*v)),
            Some(other) => Err(Self::mismatch(name, PrimitiveType::Double, other)),
        }
    }
}

/// Map a domain object onto an instance of `definition`
///
/// Every field must be declared, even one that is currently `None`.
pub fn to_instance<T: EntityMapping>(object: &T, definition: &EntityTypeDefinition) -> Result<EntityInstance> {
    let fields = object.to_values();
    if let Some((name, _)) = fields.iter().find(|(name, _)| definition.attribute(name).is_none()) {
        return Err(CatalogError::UnknownAttribute {
            type_name: definition.type_name().to_string(),
            attribute: name.to_string(),
        });
    }
    let values = fields.into_iter().filter(|(_, v)| !v.is_null());
    EntityInstance::new(definition, values)
}

/// Rebuild a domain object from an instance
pub fn from_instance<T: EntityMapping>(instance: &EntityInstance) -> Result<T> {
    T::from_values(&AttributeValues::new(instance))
}
