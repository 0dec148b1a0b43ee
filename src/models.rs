//! Data models for blueprint definition streams

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One sub-entry of a record descriptor: a categorized, flat attribute map.
///
/// The identifying instance name is still inside `fields` at this stage
/// (usually under `Name`); it is lifted out when the entry is folded into
/// an [`crate::bag::AttributeBag`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEntry {
    pub category: String,
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

/// A record descriptor as it appears in the definition stream.
///
/// Descriptors arrive in a strict parents-before-children order; `inherits`
/// names a record that must already have been defined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub inherits: Option<String>,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

/// A warning message from parsing or loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    pub message: String,
    pub line: usize,
}
