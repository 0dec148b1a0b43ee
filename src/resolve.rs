//! Inheritance resolution: materializing merged attribute bags
//!
//! Each record's resolved bag combines its local bag with its parent's
//! already-resolved bag. Children always win on fields they set; fields
//! the child lacks are backfilled from the parent, except that an
//! inherited `*noinherit` value deletes the entire (category, instance)
//! entry for the child. The pass runs in arena order, which is
//! parent-before-child by construction, and memoizes the result on the
//! record so queries never re-run the merge.

use crate::bag::{AttributeBag, FieldMarker};
use crate::registry::BlueprintRegistry;

/// Resolve every record in the registry, in definition order.
///
/// Safe to call again (results are recomputed from scratch); the loader
/// calls it once after the registry is fully populated.
pub fn resolve_all(registry: &mut BlueprintRegistry) {
    let mut resolved: Vec<AttributeBag> = Vec::with_capacity(registry.records.len());
    for record in &registry.records {
        let bag = match record.parent {
            // the root's resolved bag is its local bag
            None => record.local().clone(),
            // parent ids always precede child ids in the arena
            Some(parent_id) => merge_inherited(&resolved[parent_id.0], record.local()),
        };
        resolved.push(bag);
    }
    for (record, bag) in registry.records.iter_mut().zip(resolved) {
        record.resolved = Some(bag);
    }
}

/// Merge a parent's resolved bag underneath a child's local bag.
///
/// Works instance by instance: the child's fields are taken as-is, parent
/// fields the child lacks are copied in, and a parent field carrying the
/// `*noinherit` marker (when the child does not re-specify that field)
/// removes the whole instance. Instances and categories present in the
/// parent materialize in the child even when they end up empty.
pub fn merge_inherited(parent: &AttributeBag, local: &AttributeBag) -> AttributeBag {
    let mut merged = local.clone();
    for (category, instances) in parent.iter() {
        let merged_instances = merged.ensure_category(category);
        for (instance, parent_fields) in instances {
            let mut working = merged_instances.remove(instance).unwrap_or_default();
            let mut deleted = false;
            for (field, value) in parent_fields {
                if working.contains_key(field) {
                    // child already specifies this field - never overwrite
                    continue;
                }
                match FieldMarker::classify(value) {
                    Some(FieldMarker::NoInherit) => {
                        deleted = true;
                        break;
                    }
                    _ => {
                        working.insert(field.clone(), value.clone());
                    }
                }
            }
            if !deleted {
                merged_instances.insert(instance.clone(), working);
            }
        }
    }
    merged
}
