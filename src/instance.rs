//! Generic entity instances

use std::collections::BTreeMap;

use crate::error::{CatalogError, Result};
use crate::schema::EntityTypeDefinition;
use crate::value::AttributeValue;

/// An attribute bag conforming to an [`EntityTypeDefinition`]
///
/// Values are fixed at construction. Every key is declared by the definition and
/// every non-null value matches its attribute's primitive type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInstance {
    type_name: String,
    values: BTreeMap<String, AttributeValue>,
}

impl EntityInstance {
    /// Build an instance, checking each value against the definition
    pub fn new<K, I>(definition: &EntityTypeDefinition, values: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AttributeValue)>,
    {
        let mut checked = BTreeMap::new();
        for (name, value) in values {
            let name = name.into();
            let attribute = definition.attribute(&name).ok_or_else(|| CatalogError::UnknownAttribute {
                type_name: definition.type_name().to_string(),
                attribute: name.clone(),
            })?;
            if !value.conforms_to(attribute.primitive_type()) {
                return Err(CatalogError::type_mismatch(
                    name,
                    attribute.primitive_type(),
                    value.kind(),
                ));
            }
            if checked.contains_key(&name) {
                return Err(CatalogError::Validation(format!(
                    "attribute '{}' given more than once",
                    name
                )));
            }
            checked.insert(name, value);
        }

        Ok(Self {
            type_name: definition.type_name().to_string(),
            values: checked,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Value of an attribute, `None` when absent
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// All present attributes in name order
    pub fn values(&self) -> &BTreeMap<String, AttributeValue> {
        &self.values
    }

    /// Check that every required attribute carries a non-null value
    pub fn validate_required(&self, definition: &EntityTypeDefinition) -> Result<()> {
        if definition.type_name() != self.type_name {
            return Err(CatalogError::Validation(format!(
                "instance of {} checked against type {}",
                self.type_name,
                definition.type_name()
            )));
        }

        let missing: Vec<&str> = definition
            .required_attributes()
            .filter(|a| self.get(a.name()).map_or(true, AttributeValue::is_null))
            .map(|a| a.name())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Validation(format!(
                "{} is missing required attributes: {}",
                self.type_name,
                missing.join(", ")
            )))
        }
    }
}
