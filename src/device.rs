//! Device info: the sample domain object used by the round-trip scenario

use chrono::Utc;
use std::fmt;
use uuid::Uuid;

use crate::error::Result;
use crate::mapper::{AttributeValues, EntityMapping};
use crate::schema::{AttributeSchema, EntityTypeDefinition};
use crate::types::PrimitiveType;
use crate::value::AttributeValue;

/// A device record as stored in the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DeviceInfo {
    pub name: Option<String>,
    pub xid: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: Option<i64>,
    pub version: Option<String>,
}

impl DeviceInfo {
    pub const TYPE_NAME: &'static str = "tests.device_info";
    pub const NAME: &'static str = "name";
    pub const XID: &'static str = "xid";
    pub const TIMESTAMP: &'static str = "timestamp";
    pub const VERSION: &'static str = "version";

    /// A fresh device stamped with the current time and a random xid
    pub fn sample() -> Self {
        let now = Utc::now().timestamp_millis();
        let xid = Uuid::new_v4();
        let bytes = xid.as_bytes();
        let seed = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        Self {
            name: Some(format!("device-{}", now)),
            xid: Some(xid.to_string()),
            timestamp: Some(now),
            version: Some((seed % 10).to_string()),
        }
    }

    /// The `tests.device_info` type definition
    pub fn entity_type() -> Result<EntityTypeDefinition> {
        EntityTypeDefinition::define(
            Self::TYPE_NAME,
            vec![
                AttributeSchema::unique_required(Self::NAME, PrimitiveType::String)?,
                AttributeSchema::unique_required(Self::XID, PrimitiveType::String)?,
                AttributeSchema::optional(Self::TIMESTAMP, PrimitiveType::Long)?,
                AttributeSchema::optional(Self::VERSION, PrimitiveType::String)?,
            ],
        )
    }
}

impl EntityMapping for DeviceInfo {
    fn to_values(&self) -> Vec<(&'static str, AttributeValue)> {
        vec![
            (Self::NAME, self.name.clone().into()),
            (Self::XID, self.xid.clone().into()),
            (Self::TIMESTAMP, self.timestamp.into()),
            (Self::VERSION, self.version.clone().into()),
        ]
    }

    fn from_values(values: &AttributeValues<'_>) -> Result<Self> {
        Ok(Self {
            name: values.string(Self::NAME)?,
            xid: values.string(Self::XID)?,
            timestamp: values.long(Self::TIMESTAMP)?,
            version: values.string(Self::VERSION)?,
        })
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeviceInfo {{ name: {:?}, timestamp: {:?}, version: {:?}, xid: {:?} }}",
            self.name, self.timestamp, self.version, self.xid
        )
    }
}
