//! Data objects exchanged with the core data service.
//!
//! Field names follow the service's camelCase JSON. Timestamps are
//! milliseconds since the epoch. No validation happens client side.

use serde::{Deserialize, Serialize};

/// Value type of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoTType {
    /// Boolean
    B,
    /// Float
    F,
    /// Integer
    I,
    /// String
    S,
    /// JSON
    J,
}

impl IoTType {
    pub fn as_str(self) -> &'static str {
        match self {
            IoTType::B => "B",
            IoTType::F => "F",
            IoTType::I => "I",
            IoTType::S => "S",
            IoTType::J => "J",
        }
    }
}

/// A single sensor value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub pushed: i64,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub origin: i64,
    #[serde(default)]
    pub modified: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Name of the value descriptor this reading belongs to.
    pub name: String,
    pub value: String,
}

impl Reading {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }
}

/// A group of readings sent by one device at one time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub pushed: i64,
    /// Device id or name.
    pub device: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub modified: i64,
    #[serde(default)]
    pub origin: i64,
    #[serde(default)]
    pub readings: Vec<Reading>,
}

impl Event {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    pub fn with_reading(mut self, reading: Reading) -> Self {
        self.readings.push(reading);
        self
    }
}

/// Describes the values a device reports under one name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub modified: i64,
    #[serde(default)]
    pub origin: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub value_type: IoTType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ValueDescriptor {
    pub fn new(name: impl Into<String>, value_type: IoTType) -> Self {
        Self {
            id: None,
            created: 0,
            description: None,
            modified: 0,
            origin: 0,
            name: name.into(),
            min: None,
            max: None,
            default_value: None,
            value_type,
            uom_label: None,
            formatting: None,
            labels: Vec::new(),
        }
    }
}
