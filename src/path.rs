//! Attribute path queries: the public read interface over resolved bags
//!
//! A path names 1-3 segments - `category`, `category_instance`, or
//! `category_instance_field` - and is the only way consumers (CLI, export
//! layers) read attribute data. Lookups that find nothing return `None`;
//! that is the normal case for sparse game data and is kept strictly
//! apart from malformed paths, which are typed errors.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::bag::{AttributeBag, FieldMap, InstanceMap};
use crate::registry::{BlueprintRegistry, RecordId};

/// Error type for malformed attribute paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Input string was empty
    #[error("empty attribute path")]
    Empty,
    /// A path segment between separators was empty
    #[error("empty segment in attribute path '{0}'")]
    EmptySegment(String),
}

/// A parsed 1-3 segment attribute path.
///
/// The separator is `_`; only the first two separators split, so a field
/// segment may itself contain underscores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    category: String,
    instance: Option<String>,
    field: Option<String>,
}

impl AttributePath {
    /// Parse a path like `part`, `part_Render`, or `part_Render_Tile`.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = path.splitn(3, '_');
        let category = segments.next().unwrap_or_default().to_string();
        let instance = segments.next().map(String::from);
        let field = segments.next().map(String::from);
        if category.is_empty()
            || instance.as_deref() == Some("")
            || field.as_deref() == Some("")
        {
            return Err(PathError::EmptySegment(path.to_string()));
        }
        Ok(Self {
            category,
            instance,
            field,
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl FromStr for AttributePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)?;
        if let Some(instance) = &self.instance {
            write!(f, "_{instance}")?;
        }
        if let Some(field) = &self.field {
            write!(f, "_{field}")?;
        }
        Ok(())
    }
}

/// Borrowed view of whatever a path landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathValue<'a> {
    /// A whole category (1-segment path)
    Category(&'a InstanceMap),
    /// One instance's field map (2-segment path)
    Instance(&'a FieldMap),
    /// A single field value (3-segment path)
    Field(&'a str),
}

impl<'a> PathValue<'a> {
    /// The field string, when the path named a field.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            PathValue::Field(value) => Some(value),
            _ => None,
        }
    }
}

/// Look a path up in a bag. `None` means "not present", never an error.
pub fn query<'a>(bag: &'a AttributeBag, path: &AttributePath) -> Option<PathValue<'a>> {
    let instances = bag.category(&path.category)?;
    let instance = match &path.instance {
        Some(name) => instances.get(name)?,
        None => return Some(PathValue::Category(instances)),
    };
    match &path.field {
        Some(field) => instance.get(field).map(|v| PathValue::Field(v.as_str())),
        None => Some(PathValue::Instance(instance)),
    }
}

/// Convenience: query a 3-segment path's string value from a bag.
pub fn query_field<'a>(bag: &'a AttributeBag, path: &AttributePath) -> Option<&'a str> {
    query(bag, path).and_then(|v| v.as_str())
}

/// True when the path is present in the record's local bag - set
/// explicitly on this record rather than inherited. Walks only the local
/// bag, never the parent chain.
pub fn is_locally_specified(
    registry: &BlueprintRegistry,
    id: RecordId,
    path: &AttributePath,
) -> bool {
    query(registry.record(id).local(), path).is_some()
}

/// True when `ancestor` names this record or any record on its parent
/// chain. O(depth); the chain is acyclic by construction.
pub fn inherits_from(registry: &BlueprintRegistry, id: RecordId, ancestor: &str) -> bool {
    let mut current = Some(id);
    while let Some(record_id) = current {
        let record = registry.record(record_id);
        if record.name == ancestor {
            return true;
        }
        current = record.parent;
    }
    false
}

/// The inheritance chain from the root down to the record, by name.
pub fn lineage(registry: &BlueprintRegistry, id: RecordId) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = Some(id);
    while let Some(record_id) = current {
        let record = registry.record(record_id);
        chain.push(record.name.clone());
        current = record.parent;
    }
    chain.reverse();
    chain
}
