//! Round-trip Tests
//!
//! Drives domain objects through mapping, serialization and the simulated
//! catalogs, and checks they come back unchanged.

use entity_catalog::{
    deserialize_instance, deserialize_type, from_instance, serialize_instance, serialize_type,
    to_instance, AttributeSchema, AttributeValue, CatalogClient, CatalogError, DeviceInfo,
    DirectoryCatalog, EntityInstance, EntityTypeDefinition, InMemoryCatalog, MetadataClient,
    PrimitiveType,
};
use tempfile::tempdir;

fn fixed_device() -> DeviceInfo {
    DeviceInfo {
        name: Some("device-1700000000000".to_string()),
        xid: Some("3fa85f64-5717-4562-b3fc-2c963f66afa6".to_string()),
        timestamp: Some(1_700_000_000_000),
        version: Some("-7".to_string()),
    }
}

// =============================================================================
// End-to-end Scenario
// =============================================================================

#[test]
fn test_device_info_end_to_end() {
    let definition = DeviceInfo::entity_type().unwrap();
    let mut catalog = InMemoryCatalog::new();
    catalog.register_type(&serialize_type(&definition).unwrap()).unwrap();

    let device = fixed_device();
    let instance = to_instance(&device, &definition).unwrap();
    let text = serialize_instance(&instance).unwrap();
    assert_eq!(
        text,
        r#"{"typeName":"tests.device_info","values":{"name":"device-1700000000000","timestamp":1700000000000,"version":"-7","xid":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}}"#
    );

    let id = catalog.create_entity(&text).unwrap();
    let fetched = catalog.get_entity(&id).unwrap();
    let restored_instance = deserialize_instance(&fetched, &definition).unwrap();
    assert_eq!(restored_instance, instance);

    let restored: DeviceInfo = from_instance(&restored_instance).unwrap();
    assert_eq!(restored, device);
}

#[test]
fn test_metadata_client_round_trip() {
    let definition = DeviceInfo::entity_type().unwrap();
    let mut client = MetadataClient::new(InMemoryCatalog::new());
    client.register_type(&definition).unwrap();

    let minimal = DeviceInfo {
        name: Some("device-2".to_string()),
        xid: Some("xid-2".to_string()),
        timestamp: Some(-1),
        version: None,
    };
    for device in [fixed_device(), DeviceInfo::sample(), minimal] {
        let id = client.create(&device, &definition).unwrap();
        let stored: DeviceInfo = client.get(&id, &definition).unwrap();
        assert_eq!(stored, device);
    }
    assert_eq!(client.catalog().entity_count(), 3);
}

#[test]
fn test_optional_fields_stay_absent() {
    let definition = DeviceInfo::entity_type().unwrap();
    let mut client = MetadataClient::new(InMemoryCatalog::new());
    client.register_type(&definition).unwrap();

    let device = DeviceInfo {
        timestamp: None,
        version: None,
        ..fixed_device()
    };
    let id = client.create(&device, &definition).unwrap();
    let stored: DeviceInfo = client.get(&id, &definition).unwrap();
    assert_eq!(stored, device);
    assert_eq!(stored.timestamp, None);
}

#[test]
fn test_directory_catalog_round_trip_across_reopen() {
    let dir = tempdir().unwrap();
    let definition = DeviceInfo::entity_type().unwrap();
    let device = fixed_device();

    let id = {
        let mut client = MetadataClient::new(DirectoryCatalog::open(dir.path()).unwrap());
        client.register_type(&definition).unwrap();
        client.create(&device, &definition).unwrap()
    };

    let client = MetadataClient::new(DirectoryCatalog::open(dir.path()).unwrap());
    assert_eq!(client.catalog().type_names(), vec![DeviceInfo::TYPE_NAME.to_string()]);
    let stored: DeviceInfo = client.get(&id, &definition).unwrap();
    assert_eq!(stored, device);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_type_document_round_trip() {
    let definition = DeviceInfo::entity_type().unwrap();
    let text = serialize_type(&definition).unwrap();
    let parsed = deserialize_type(&text).unwrap();
    assert_eq!(parsed, definition);
    assert_eq!(serialize_type(&parsed).unwrap(), text);
}

#[test]
fn test_instance_serialization_is_idempotent() {
    let definition = EntityTypeDefinition::define(
        "tests.all_kinds",
        vec![
            AttributeSchema::required("s", PrimitiveType::String).unwrap(),
            AttributeSchema::optional("l", PrimitiveType::Long).unwrap(),
            AttributeSchema::optional("i", PrimitiveType::Int).unwrap(),
            AttributeSchema::optional("b", PrimitiveType::Boolean).unwrap(),
            AttributeSchema::optional("d", PrimitiveType::Double).unwrap(),
            AttributeSchema::optional("n", PrimitiveType::String).unwrap(),
        ],
    )
    .unwrap();

    let instances = [
        vec![
            ("s", AttributeValue::from("")),
            ("l", AttributeValue::Long(i64::MIN)),
            ("i", AttributeValue::Int(i32::MAX)),
            ("b", AttributeValue::Boolean(true)),
            ("d", AttributeValue::Double(-0.25)),
            ("n", AttributeValue::Null),
        ],
        vec![
            ("s", AttributeValue::from("unicode ✓ \"quoted\"")),
            ("l", AttributeValue::Long(0)),
            ("d", AttributeValue::Double(1e300)),
        ],
    ];

    for values in instances {
        let instance = EntityInstance::new(&definition, values).unwrap();
        let text = serialize_instance(&instance).unwrap();
        let decoded = deserialize_instance(&text, &definition).unwrap();
        assert_eq!(decoded, instance);
        assert_eq!(serialize_instance(&decoded).unwrap(), text);
    }
}

#[test]
fn test_parse_error_is_distinct_from_type_mismatch() {
    let definition = DeviceInfo::entity_type().unwrap();

    let malformed = deserialize_instance(r#"{"typeName":"tests.device_info","values":"#, &definition);
    assert!(matches!(malformed, Err(CatalogError::Parse(_))));

    let mistyped = deserialize_instance(
        r#"{"typeName":"tests.device_info","values":{"timestamp":"1700000000000"}}"#,
        &definition,
    );
    assert!(matches!(mistyped, Err(CatalogError::TypeMismatch { .. })));
}

// =============================================================================
// Catalog Contract
// =============================================================================

#[test]
fn test_duplicate_attribute_names_rejected() {
    let result = EntityTypeDefinition::define(
        "tests.device_info",
        vec![
            AttributeSchema::unique_required("name", PrimitiveType::String).unwrap(),
            AttributeSchema::optional("name", PrimitiveType::Long).unwrap(),
        ],
    );
    assert!(matches!(result, Err(CatalogError::InvalidSchema(_))));
}

#[test]
fn test_missing_required_attribute_fails_validation() {
    let definition = DeviceInfo::entity_type().unwrap();
    let mut catalog = InMemoryCatalog::new();
    catalog.register_type(&serialize_type(&definition).unwrap()).unwrap();

    let device = DeviceInfo {
        xid: None,
        ..fixed_device()
    };
    let text = serialize_instance(&to_instance(&device, &definition).unwrap()).unwrap();
    let err = catalog.create_entity(&text).unwrap_err();
    assert!(matches!(err, CatalogError::Validation(msg) if msg.contains("xid")));
}

#[test]
fn test_unique_attribute_enforced() {
    let definition = DeviceInfo::entity_type().unwrap();
    let mut client = MetadataClient::new(InMemoryCatalog::new());
    client.register_type(&definition).unwrap();

    client.create(&fixed_device(), &definition).unwrap();
    let clash = DeviceInfo {
        xid: Some("another-xid".to_string()),
        ..fixed_device()
    };
    let err = client.create(&clash, &definition).unwrap_err();
    assert!(matches!(err, CatalogError::Validation(msg) if msg.contains("name")));
}

#[test]
fn test_registration_is_idempotent() {
    let definition = DeviceInfo::entity_type().unwrap();
    let text = serialize_type(&definition).unwrap();

    let mut catalog = InMemoryCatalog::new();
    let first = catalog.register_type(&text).unwrap();
    let second = catalog.register_type(&text).unwrap();
    assert_eq!(first, second);
    assert_eq!(catalog.type_names().len(), 1);

    let mut client = MetadataClient::new(catalog);
    assert!(client.register_type(&definition).unwrap().is_none());
}

#[test]
fn test_get_unknown_entity_is_not_found() {
    let catalog = InMemoryCatalog::new();
    let err = catalog.get_entity(&entity_catalog::EntityId::new()).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}
