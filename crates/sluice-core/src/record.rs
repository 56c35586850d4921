use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record metadata that travels alongside the value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Identifier assigned by the origin of the record
    #[serde(default)]
    pub source_id: String,
    /// Free-form string attributes, e.g. stamped by interceptors
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// A single unit of data flowing through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub header: RecordHeader,
    #[serde(default)]
    pub value: Value,
}

impl Record {
    pub fn new(source_id: impl Into<String>, value: Value) -> Self {
        Self {
            header: RecordHeader {
                source_id: source_id.into(),
                attributes: BTreeMap::new(),
            },
            value,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.header.source_id
    }

    /// Look up a field by JSON pointer (`/address/city`)
    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.value.pointer(pointer)
    }

    pub fn field_mut(&mut self, pointer: &str) -> Option<&mut Value> {
        self.value.pointer_mut(pointer)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.header.attributes.get(name).map(|s| s.as_str())
    }

    /// Set a header attribute, returning the previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.header.attributes.insert(name.into(), value.into())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.header.attributes.remove(name)
    }
}
