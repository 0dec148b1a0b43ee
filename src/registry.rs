//! Blueprint registry: the authoritative name -> record table
//!
//! Records live in an arena addressed by [`RecordId`]; the registry is the
//! only owner. Construction is a single sequential pass in definition
//! order - each record's parent lookup happens at construction time, so
//! parents must precede children in the stream. After the load pass the
//! registry is never mutated.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::bag::AttributeBag;
use crate::models::RecordDescriptor;
use crate::resolve;

/// Stable handle to a record in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub(crate) usize);

/// Fatal configuration errors that abort the load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// A record names a parent that has not been defined yet.
    #[error("record '{record}' inherits from unknown parent '{parent}'")]
    UnknownParent { record: String, parent: String },
    /// Record names are the primary key; redefinition is a data error.
    #[error("duplicate record name '{0}'")]
    DuplicateName(String),
    /// The inheritance tree has exactly one root.
    #[error("record '{second}' has no parent but the tree is already rooted at '{root}'")]
    SecondRoot { root: String, second: String },
}

/// A non-fatal condition noticed while folding a record's entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadWarning {
    pub record: String,
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.record, self.message)
    }
}

/// One node of the inheritance tree.
#[derive(Debug, Clone)]
pub struct BlueprintRecord {
    pub name: String,
    pub parent: Option<RecordId>,
    pub children: Vec<RecordId>,
    pub(crate) local: AttributeBag,
    pub(crate) resolved: Option<AttributeBag>,
}

impl BlueprintRecord {
    /// The record's own attributes, before inheritance.
    pub fn local(&self) -> &AttributeBag {
        &self.local
    }

    /// The fully inheritance-merged attributes, once the resolution pass
    /// has run.
    pub fn resolved(&self) -> Option<&AttributeBag> {
        self.resolved.as_ref()
    }
}

/// Result of loading a full descriptor sequence.
#[derive(Debug)]
pub struct LoadResult {
    pub registry: BlueprintRegistry,
    pub warnings: Vec<LoadWarning>,
}

/// Arena of blueprint records plus the name index.
#[derive(Debug, Clone, Default)]
pub struct BlueprintRegistry {
    pub(crate) records: Vec<BlueprintRecord>,
    index: HashMap<String, RecordId>,
    root: Option<RecordId>,
}

impl BlueprintRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct one record from its descriptor and append it.
    ///
    /// The parent lookup is the construction-time invariant: an unknown
    /// parent means the tree cannot be built and the load must abort.
    /// Returns entry-folding messages alongside the new id.
    pub fn insert(
        &mut self,
        descriptor: &RecordDescriptor,
    ) -> Result<(RecordId, Vec<String>), LoadError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(LoadError::DuplicateName(descriptor.name.clone()));
        }

        let parent = match &descriptor.inherits {
            Some(parent_name) => {
                let parent_id =
                    self.index
                        .get(parent_name)
                        .copied()
                        .ok_or_else(|| LoadError::UnknownParent {
                            record: descriptor.name.clone(),
                            parent: parent_name.clone(),
                        })?;
                Some(parent_id)
            }
            None => {
                if let Some(root_id) = self.root {
                    return Err(LoadError::SecondRoot {
                        root: self.records[root_id.0].name.clone(),
                        second: descriptor.name.clone(),
                    });
                }
                None
            }
        };

        let (local, skipped) = AttributeBag::from_entries(&descriptor.entries);
        let id = RecordId(self.records.len());
        self.records.push(BlueprintRecord {
            name: descriptor.name.clone(),
            parent,
            children: Vec::new(),
            local,
            resolved: None,
        });
        self.index.insert(descriptor.name.clone(), id);
        match parent {
            Some(parent_id) => self.records[parent_id.0].children.push(id),
            None => self.root = Some(id),
        }

        Ok((id, skipped))
    }

    /// Load a full descriptor sequence and run the resolution pass.
    pub fn from_descriptors(descriptors: &[RecordDescriptor]) -> Result<LoadResult, LoadError> {
        let mut registry = BlueprintRegistry::new();
        let mut warnings = Vec::new();
        for descriptor in descriptors {
            let (_, skipped) = registry.insert(descriptor)?;
            warnings.extend(skipped.into_iter().map(|message| LoadWarning {
                record: descriptor.name.clone(),
                message,
            }));
        }
        resolve::resolve_all(&mut registry);
        Ok(LoadResult { registry, warnings })
    }

    /// Look up a record id by name.
    pub fn id(&self, name: &str) -> Option<RecordId> {
        self.index.get(name).copied()
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Option<&BlueprintRecord> {
        self.id(name).map(|id| &self.records[id.0])
    }

    /// Fetch a record by id.
    pub fn record(&self, id: RecordId) -> &BlueprintRecord {
        &self.records[id.0]
    }

    /// The tree root, once a parentless record has been inserted.
    pub fn root(&self) -> Option<RecordId> {
        self.root
    }

    /// Number of records loaded.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records have been loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate (id, record) pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &BlueprintRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (RecordId(i), record))
    }
}
