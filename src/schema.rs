//! Attribute and entity type definitions

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::checksum::Checksum;
use crate::error::{CatalogError, Result};
use crate::types::PrimitiveType;

/// Whether an attribute must carry a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    Required,
    Optional,
}

impl Multiplicity {
    /// Get the wire name
    pub fn name(&self) -> &'static str {
        match self {
            Multiplicity::Required => "required",
            Multiplicity::Optional => "optional",
        }
    }
}

/// A single named, typed attribute of an entity type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSchema {
    name: String,
    primitive_type: PrimitiveType,
    multiplicity: Multiplicity,
    unique: bool,
    composite: bool,
    reverse_attribute_name: Option<String>,
}

impl AttributeSchema {
    /// Define an attribute
    ///
    /// Fails with [`CatalogError::InvalidSchema`] when `name` is empty.
    pub fn define(
        name: impl Into<String>,
        primitive_type: PrimitiveType,
        multiplicity: Multiplicity,
        unique: bool,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidSchema(
                "attribute name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            primitive_type,
            multiplicity,
            unique,
            composite: false,
            reverse_attribute_name: None,
        })
    }

    /// Required attribute whose value is unique across all instances of the type
    pub fn unique_required(name: impl Into<String>, primitive_type: PrimitiveType) -> Result<Self> {
        Self::define(name, primitive_type, Multiplicity::Required, true)
    }

    /// Required, non-unique attribute
    pub fn required(name: impl Into<String>, primitive_type: PrimitiveType) -> Result<Self> {
        Self::define(name, primitive_type, Multiplicity::Required, false)
    }

    /// Optional, non-unique attribute
    pub fn optional(name: impl Into<String>, primitive_type: PrimitiveType) -> Result<Self> {
        Self::define(name, primitive_type, Multiplicity::Optional, false)
    }

    /// Mark the attribute as a composite (owning) relation
    pub fn with_composite(mut self, composite: bool) -> Self {
        self.composite = composite;
        self
    }

    /// Set the reverse attribute name
    pub fn with_reverse_attribute(mut self, name: impl Into<String>) -> Self {
        self.reverse_attribute_name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    pub fn is_required(&self) -> bool {
        self.multiplicity == Multiplicity::Required
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    pub fn reverse_attribute_name(&self) -> Option<&str> {
        self.reverse_attribute_name.as_deref()
    }

    fn canonical_entry(&self) -> serde_json::Value {
        json!([
            self.name,
            self.primitive_type.name(),
            self.multiplicity.name(),
            self.composite,
            self.unique,
            self.reverse_attribute_name,
        ])
    }
}

/// Dotted identifier form, e.g. `tests.device_info`
fn type_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .expect("type name pattern is valid")
    })
}

/// A named entity type: the contract a conforming instance must satisfy
///
/// Immutable once defined. Attribute order is preserved as declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTypeDefinition {
    type_name: String,
    attributes: Vec<AttributeSchema>,
}

impl EntityTypeDefinition {
    /// Define an entity type
    ///
    /// Fails with [`CatalogError::InvalidSchema`] if the type name is empty or not
    /// a dotted identifier, if there are no attributes, or if two attributes share
    /// a name.
    pub fn define(type_name: impl Into<String>, attributes: Vec<AttributeSchema>) -> Result<Self> {
        let type_name = type_name.into();
        if type_name.is_empty() {
            return Err(CatalogError::InvalidSchema(
                "type name must not be empty".to_string(),
            ));
        }
        if !type_name_pattern().is_match(&type_name) {
            return Err(CatalogError::InvalidSchema(format!(
                "type name '{}' is not a dotted identifier",
                type_name
            )));
        }
        if attributes.is_empty() {
            return Err(CatalogError::InvalidSchema(format!(
                "type {} declares no attributes",
                type_name
            )));
        }

        let mut seen = HashSet::new();
        for attribute in &attributes {
            if !seen.insert(attribute.name()) {
                return Err(CatalogError::InvalidSchema(format!(
                    "type {} declares attribute '{}' more than once",
                    type_name,
                    attribute.name()
                )));
            }
        }

        Ok(Self {
            type_name,
            attributes,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attributes(&self) -> &[AttributeSchema] {
        &self.attributes
    }

    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attributes that must be non-null on creation
    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeSchema> {
        self.attributes.iter().filter(|a| a.is_required())
    }

    /// Attributes whose values must be unique across instances
    pub fn unique_attributes(&self) -> impl Iterator<Item = &AttributeSchema> {
        self.attributes.iter().filter(|a| a.is_unique())
    }

    /// Fingerprint of the attribute set
    ///
    /// Independent of declaration order, so two definitions with the same name
    /// and the same attributes always share a checksum.
    pub fn checksum(&self) -> Checksum {
        let mut attributes: Vec<&AttributeSchema> = self.attributes.iter().collect();
        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        let entries: Vec<serde_json::Value> = attributes.iter().map(|a| a.canonical_entry()).collect();
        Checksum::from_json(&json!([self.type_name, entries]))
    }

    /// Whether another definition describes the same type
    pub fn is_compatible_with(&self, other: &EntityTypeDefinition) -> bool {
        self.type_name == other.type_name && self.checksum() == other.checksum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_attr() -> AttributeSchema {
        AttributeSchema::unique_required("name", PrimitiveType::String).unwrap()
    }

    #[test]
    fn test_empty_attribute_name_rejected() {
        let err = AttributeSchema::optional("", PrimitiveType::Long).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSchema(_)));
    }

    #[test]
    fn test_attribute_builders() {
        let attr = name_attr();
        assert!(attr.is_required());
        assert!(attr.is_unique());
        assert!(!attr.is_composite());

        let attr = AttributeSchema::optional("owner", PrimitiveType::String)
            .unwrap()
            .with_composite(true)
            .with_reverse_attribute("devices");
        assert_eq!(attr.multiplicity(), Multiplicity::Optional);
        assert!(attr.is_composite());
        assert_eq!(attr.reverse_attribute_name(), Some("devices"));
    }

    #[test]
    fn test_define_type() {
        let def = EntityTypeDefinition::define(
            "tests.device_info",
            vec![
                name_attr(),
                AttributeSchema::optional("timestamp", PrimitiveType::Long).unwrap(),
            ],
        )
        .unwrap();

        assert_eq!(def.type_name(), "tests.device_info");
        assert_eq!(def.attributes().len(), 2);
        assert_eq!(def.attribute("timestamp").unwrap().primitive_type(), PrimitiveType::Long);
        assert!(def.attribute("missing").is_none());
        assert_eq!(def.required_attributes().count(), 1);
        assert_eq!(def.unique_attributes().count(), 1);
    }

    #[test]
    fn test_duplicate_attribute_names_rejected() {
        let err = EntityTypeDefinition::define("tests.dup", vec![name_attr(), name_attr()]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSchema(msg) if msg.contains("more than once")));
    }

    #[test]
    fn test_invalid_type_names_rejected() {
        for bad in ["", "tests.", ".device", "tests..device", "has space", "9lives"] {
            let result = EntityTypeDefinition::define(bad, vec![name_attr()]);
            assert!(
                matches!(result, Err(CatalogError::InvalidSchema(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_no_attributes_rejected() {
        let err = EntityTypeDefinition::define("tests.empty", vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSchema(_)));
    }

    #[test]
    fn test_checksum_ignores_declaration_order() {
        let ts = AttributeSchema::optional("timestamp", PrimitiveType::Long).unwrap();
        let a = EntityTypeDefinition::define("tests.t", vec![name_attr(), ts.clone()]).unwrap();
        let b = EntityTypeDefinition::define("tests.t", vec![ts, name_attr()]).unwrap();
        assert_eq!(a.checksum(), b.checksum());
        assert!(a.is_compatible_with(&b));
    }

    #[test]
    fn test_checksum_detects_changed_attributes() {
        let a = EntityTypeDefinition::define("tests.t", vec![name_attr()]).unwrap();
        let b = EntityTypeDefinition::define(
            "tests.t",
            vec![AttributeSchema::optional("name", PrimitiveType::String).unwrap()],
        )
        .unwrap();
        assert_ne!(a.checksum(), b.checksum());
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_checksum_separates_attribute_fields() {
        // Separator characters inside names must not make two attribute sets look alike
        let folded = EntityTypeDefinition::define(
            "tests.t",
            vec![AttributeSchema::optional("a", PrimitiveType::String)
                .unwrap()
                .with_reverse_attribute("\nb|string|optional|false|false|")],
        )
        .unwrap();
        let split = EntityTypeDefinition::define(
            "tests.t",
            vec![
                AttributeSchema::optional("a", PrimitiveType::String).unwrap(),
                AttributeSchema::optional("b", PrimitiveType::String).unwrap(),
            ],
        )
        .unwrap();
        assert_ne!(folded.checksum(), split.checksum());
        assert!(!folded.is_compatible_with(&split));
    }

    #[test]
    fn test_checksum_distinguishes_missing_and_empty_reverse() {
        let plain = AttributeSchema::optional("owner", PrimitiveType::String).unwrap();
        let a = EntityTypeDefinition::define("tests.t", vec![plain.clone()]).unwrap();
        let b = EntityTypeDefinition::define("tests.t", vec![plain.with_reverse_attribute("")]).unwrap();
        assert_ne!(a.checksum(), b.checksum());
    }
}
