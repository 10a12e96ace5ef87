//! JSON wire format for type definitions and entity instances
//!
//! Type definition document:
//!
//! ```json
//! {
//!   "typeName": "tests.device_info",
//!   "attributeDefinitions": [
//!     {
//!       "name": "name",
//!       "dataTypeName": "string",
//!       "multiplicity": "required",
//!       "isComposite": false,
//!       "isUnique": true,
//!       "reverseAttributeName": null
//!     }
//!   ]
//! }
//! ```
//!
//! Entity instance document:
//!
//! ```json
//! { "typeName": "tests.device_info", "values": { "name": "device-1", "timestamp": 1700000000000 } }
//! ```
//!
//! Instance documents carry no per-value type tags. Integral values are written
//! as integer literals and doubles always with a fractional part; on the way back
//! the declared attribute types decide whether a literal is a `long`, an `int` or
//! a `double`.

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::{CatalogError, Result};
use crate::instance::EntityInstance;
use crate::schema::{AttributeSchema, EntityTypeDefinition, Multiplicity};
use crate::types::PrimitiveType;
use crate::value::AttributeValue;

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pretty,
    #[default]
    Compact,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeDocument {
    type_name: String,
    attribute_definitions: Vec<AttributeDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeDocument {
    name: String,
    data_type_name: String,
    multiplicity: Multiplicity,
    #[serde(default)]
    is_composite: bool,
    #[serde(default)]
    is_unique: bool,
    #[serde(default)]
    reverse_attribute_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceDocument {
    type_name: String,
    #[serde(default)]
    values: AttributeEntries,
}

/// The `values` object of an instance document, in document order
///
/// A repeated key is rejected instead of letting the last one win.
#[derive(Debug, Default)]
struct AttributeEntries(Vec<(String, Value)>);

impl Serialize for AttributeEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct AttributeEntriesVisitor;

impl<'de> Visitor<'de> for AttributeEntriesVisitor {
    type Value = AttributeEntries;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object of attribute values")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            if !seen.insert(name.clone()) {
                return Err(de::Error::custom(format!("duplicate attribute `{}`", name)));
            }
            entries.push((name, value));
        }
        Ok(AttributeEntries(entries))
    }
}

impl<'de> Deserialize<'de> for AttributeEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeEntriesVisitor)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeNameOnly {
    type_name: String,
}

fn to_text<T: Serialize>(document: &T, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(document)?,
        OutputFormat::Compact => serde_json::to_string(document)?,
    };
    Ok(text)
}

/// Serialize a type definition in compact form
pub fn serialize_type(definition: &EntityTypeDefinition) -> Result<String> {
    serialize_type_with(definition, OutputFormat::Compact)
}

/// Serialize a type definition
pub fn serialize_type_with(definition: &EntityTypeDefinition, format: OutputFormat) -> Result<String> {
    let document = TypeDocument {
        type_name: definition.type_name().to_string(),
        attribute_definitions: definition
            .attributes()
            .iter()
            .map(|a| AttributeDocument {
                name: a.name().to_string(),
                data_type_name: a.primitive_type().name().to_string(),
                multiplicity: a.multiplicity(),
                is_composite: a.is_composite(),
                is_unique: a.is_unique(),
                reverse_attribute_name: a.reverse_attribute_name().map(String::from),
            })
            .collect(),
    };
    to_text(&document, format)
}

/// Parse a type definition document
///
/// Malformed JSON fails with [`CatalogError::Parse`]; a well-formed document that
/// breaks a definition rule fails with [`CatalogError::InvalidSchema`].
pub fn deserialize_type(text: &str) -> Result<EntityTypeDefinition> {
    let document: TypeDocument = serde_json::from_str(text)?;

    let attributes = document
        .attribute_definitions
        .into_iter()
        .map(|a| -> Result<AttributeSchema> {
            let primitive_type = PrimitiveType::from_name(&a.data_type_name)?;
            let mut attribute = AttributeSchema::define(a.name, primitive_type, a.multiplicity, a.is_unique)?
                .with_composite(a.is_composite);
            if let Some(reverse) = a.reverse_attribute_name {
                attribute = attribute.with_reverse_attribute(reverse);
            }
            Ok(attribute)
        })
        .collect::<Result<Vec<_>>>()?;

    EntityTypeDefinition::define(document.type_name, attributes)
}

/// Serialize an entity instance in compact form
pub fn serialize_instance(instance: &EntityInstance) -> Result<String> {
    serialize_instance_with(instance, OutputFormat::Compact)
}

/// Serialize an entity instance
pub fn serialize_instance_with(instance: &EntityInstance, format: OutputFormat) -> Result<String> {
    let values = instance
        .values()
        .iter()
        .map(|(name, value)| Ok((name.clone(), encode_value(name, value)?)))
        .collect::<Result<Vec<_>>>()?;
    let document = InstanceDocument {
        type_name: instance.type_name().to_string(),
        values: AttributeEntries(values),
    };
    to_text(&document, format)
}

/// Parse an entity instance document of type `definition`
pub fn deserialize_instance(text: &str, definition: &EntityTypeDefinition) -> Result<EntityInstance> {
    let document: InstanceDocument = serde_json::from_str(text)?;
    if document.type_name != definition.type_name() {
        return Err(CatalogError::Validation(format!(
            "document is of type {}, expected {}",
            document.type_name,
            definition.type_name()
        )));
    }

    let mut values = Vec::with_capacity(document.values.0.len());
    for (name, raw) in document.values.0 {
        let attribute = definition.attribute(&name).ok_or_else(|| CatalogError::UnknownAttribute {
            type_name: document.type_name.clone(),
            attribute: name.clone(),
        })?;
        let value = decode_value(&name, attribute.primitive_type(), &raw)?;
        values.push((name, value));
    }

    EntityInstance::new(definition, values)
}

/// Read the `typeName` of an instance or type document without decoding the rest
pub fn peek_type_name(text: &str) -> Result<String> {
    let document: TypeNameOnly = serde_json::from_str(text)?;
    Ok(document.type_name)
}

fn encode_value(name: &str, value: &AttributeValue) -> Result<Value> {
    let encoded = match value {
        AttributeValue::String(v) => Value::String(v.clone()),
        AttributeValue::Long(v) => Value::from(*v),
        AttributeValue::Int(v) => Value::from(*v),
        AttributeValue::Boolean(v) => Value::Bool(*v),
        AttributeValue::Double(v) => Number::from_f64(*v)
            .map(Value::Number)
            .ok_or_else(|| CatalogError::type_mismatch(name, "finite double", v))?,
        AttributeValue::Null => Value::Null,
    };
    Ok(encoded)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode_value(name: &str, expected: PrimitiveType, raw: &Value) -> Result<AttributeValue> {
    if raw.is_null() {
        return Ok(AttributeValue::Null);
    }

    let decoded = match expected {
        PrimitiveType::String => raw.as_str().map(|s| AttributeValue::String(s.to_string())),
        PrimitiveType::Long => raw.as_i64().map(AttributeValue::Long),
        PrimitiveType::Int => raw
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(AttributeValue::Int),
        PrimitiveType::Boolean => raw.as_bool().map(AttributeValue::Boolean),
        PrimitiveType::Double => raw.as_f64().map(AttributeValue::Double),
    };

    decoded.ok_or_else(|| CatalogError::type_mismatch(name, expected, json_kind(raw)))
}
