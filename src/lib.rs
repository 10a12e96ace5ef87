//! Entity Catalog Client
//!
//! A schema-driven entity model with lossless round-trip serialization for
//! metadata catalogs.
//!
//! ## Features
//!
//! - **Typed Schemas**: Entity types declare named attributes over a closed set of primitive types
//! - **Validated Instances**: Attribute bags are checked against their type on construction
//! - **Domain Mapping**: Strongly-typed objects convert to and from instances via [`EntityMapping`]
//! - **Canonical JSON**: Type and instance documents round-trip without widening or narrowing values
//! - **Catalog Boundary**: A narrow [`CatalogClient`] trait with in-memory and directory-backed simulations
//!
//! ## Data Flow
//!
//! ```text
//! DeviceInfo ──to_instance──▶ EntityInstance ──serialize_instance──▶ JSON
//!                                                                     │
//!                                                          create_entity
//!                                                                     ▼
//!                                                                  catalog
//!                                                                     │
//!                                                             get_entity
//!                                                                     ▼
//! DeviceInfo ◀─from_instance── EntityInstance ◀─deserialize_instance─ JSON
//! ```

pub mod catalog;
pub mod checksum;
pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod instance;
pub mod mapper;
pub mod schema;
pub mod serializer;
pub mod types;
pub mod value;

pub use catalog::{CatalogClient, DirectoryCatalog, EntityId, InMemoryCatalog, TypeHandle};
pub use checksum::Checksum;
pub use client::MetadataClient;
pub use config::ClientConfig;
pub use device::DeviceInfo;
pub use error::{CatalogError, Result};
pub use instance::EntityInstance;
pub use mapper::{from_instance, to_instance, AttributeValues, EntityMapping};
pub use schema::{AttributeSchema, EntityTypeDefinition, Multiplicity};
pub use serializer::{
    deserialize_instance, deserialize_type, serialize_instance, serialize_type, OutputFormat,
};
pub use types::PrimitiveType;
pub use value::AttributeValue;
