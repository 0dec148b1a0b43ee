//! Attribute bags: the typed nested map behind every blueprint record
//!
//! A bag maps category -> instance name -> field -> value. Both the local
//! (as-written) and resolved (inheritance-merged) views of a record use
//! this structure. Presence is always explicit: an instance with no fields
//! is still present, and callers must never infer absence from emptiness.

use std::collections::HashMap;

use crate::models::RawEntry;

/// Flat field map of one sub-entry instance.
pub type FieldMap = HashMap<String, String>;

/// All instances of one category, keyed by instance name.
pub type InstanceMap = HashMap<String, FieldMap>;

/// Field value that un-inherits an entire (category, instance) entry for
/// descendants. Part of the external data contract.
pub const NO_INHERIT: &str = "*noinherit";

/// Field value that disables an inherited painted-surface tag.
pub const DELETE: &str = "*delete";

/// Typed view of the sentinel field values.
///
/// Raw field strings are classified here, at the single point where a
/// value is read; everything downstream branches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMarker {
    NoInherit,
    Delete,
}

impl FieldMarker {
    /// Classify a raw field value, or `None` for ordinary data.
    pub fn classify(value: &str) -> Option<FieldMarker> {
        match value {
            NO_INHERIT => Some(FieldMarker::NoInherit),
            DELETE => Some(FieldMarker::Delete),
            _ => None,
        }
    }
}

/// Ordered mapping from (category, instance name) to flat field maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBag {
    categories: HashMap<String, InstanceMap>,
}

impl AttributeBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a descriptor's raw entries into a bag.
    ///
    /// Instance-name derivation per category:
    /// - entries with a `Name` field use it (lifted out of the field map);
    /// - `xtag*` categories without a `Name` collapse to category `xtag`
    ///   with the prefix-stripped remainder as the instance name;
    /// - `inventoryobject` entries without a `Name` use their `Blueprint`
    ///   field (lifted out) instead;
    /// - anything else without an identifying field is skipped, reported
    ///   in the returned messages.
    ///
    /// A repeated (category, instance) pair merges field-by-field into the
    /// earlier definition; fields already present are kept, not replaced.
    pub fn from_entries(entries: &[RawEntry]) -> (Self, Vec<String>) {
        let mut bag = AttributeBag::new();
        let mut skipped = Vec::new();

        for entry in entries {
            let mut fields = entry.fields.clone();
            let (category, instance) = if let Some(name) = fields.remove("Name") {
                (entry.category.clone(), name)
            } else if let Some(suffix) = entry.category.strip_prefix("xtag") {
                if suffix.is_empty() {
                    skipped.push("xtag entry with no name suffix skipped".to_string());
                    continue;
                }
                ("xtag".to_string(), suffix.to_string())
            } else if entry.category == "inventoryobject" {
                match fields.remove("Blueprint") {
                    Some(blueprint) => (entry.category.clone(), blueprint),
                    None => {
                        skipped.push("inventoryobject entry without Blueprint skipped".to_string());
                        continue;
                    }
                }
            } else {
                skipped.push(format!(
                    "{} entry without identifying field skipped",
                    entry.category
                ));
                continue;
            };

            let instances = bag.categories.entry(category).or_default();
            match instances.get_mut(&instance) {
                Some(existing) => {
                    // Repeated definition: backfill only the fields the
                    // earlier one didn't set.
                    for (field, value) in fields {
                        existing.entry(field).or_insert(value);
                    }
                }
                None => {
                    instances.insert(instance, fields);
                }
            }
        }

        (bag, skipped)
    }

    /// All instances of a category, if the category is present.
    pub fn category(&self, category: &str) -> Option<&InstanceMap> {
        self.categories.get(category)
    }

    /// One instance's field map, if present.
    pub fn instance(&self, category: &str, instance: &str) -> Option<&FieldMap> {
        self.categories.get(category)?.get(instance)
    }

    /// One field's value, if present.
    pub fn field(&self, category: &str, instance: &str, field: &str) -> Option<&str> {
        self.instance(category, instance)?
            .get(field)
            .map(String::as_str)
    }

    /// Iterate categories (unspecified order).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InstanceMap)> {
        self.categories.iter()
    }

    /// True when the bag holds no categories at all.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Make sure a category exists, returning its instance map.
    pub(crate) fn ensure_category(&mut self, category: &str) -> &mut InstanceMap {
        self.categories.entry(category.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: &str, fields: &[(&str, &str)]) -> RawEntry {
        RawEntry {
            category: category.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_name_lifted_out_of_fields() {
        let (bag, skipped) = AttributeBag::from_entries(&[entry(
            "part",
            &[("Name", "Render"), ("DisplayName", "torch")],
        )]);
        assert!(skipped.is_empty());
        let render = bag.instance("part", "Render").unwrap();
        assert_eq!(render.get("DisplayName"), Some(&"torch".to_string()));
        assert!(!render.contains_key("Name"));
    }

    #[test]
    fn test_empty_entry_is_present() {
        let (bag, _) = AttributeBag::from_entries(&[entry("part", &[("Name", "Medication")])]);
        let medication = bag.instance("part", "Medication").unwrap();
        assert!(medication.is_empty());
        // present-but-empty is distinguishable from absent
        assert!(bag.instance("part", "Missing").is_none());
    }

    #[test]
    fn test_xtag_prefix_stripped() {
        let (bag, _) = AttributeBag::from_entries(&[entry("xtagGrammar", &[("Proper", "true")])]);
        assert_eq!(bag.field("xtag", "Grammar", "Proper"), Some("true"));
        assert!(bag.category("xtagGrammar").is_none());
    }

    #[test]
    fn test_xtag_with_name_keeps_full_category() {
        let (bag, _) =
            AttributeBag::from_entries(&[entry("xtagGrammar", &[("Name", "Special"), ("a", "1")])]);
        assert_eq!(bag.field("xtagGrammar", "Special", "a"), Some("1"));
        assert!(bag.category("xtag").is_none());
    }

    #[test]
    fn test_inventoryobject_uses_blueprint_field() {
        let (bag, _) = AttributeBag::from_entries(&[entry(
            "inventoryobject",
            &[("Blueprint", "Torch"), ("Number", "1")],
        )]);
        let torch = bag.instance("inventoryobject", "Torch").unwrap();
        assert_eq!(torch.get("Number"), Some(&"1".to_string()));
        assert!(!torch.contains_key("Blueprint"));
    }

    #[test]
    fn test_unidentifiable_entry_skipped() {
        let (bag, skipped) =
            AttributeBag::from_entries(&[entry("intproperty", &[("Value", "0")])]);
        assert!(bag.is_empty());
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].contains("intproperty"));
    }

    #[test]
    fn test_duplicate_instance_merges_without_overwrite() {
        let (bag, _) = AttributeBag::from_entries(&[
            entry(
                "part",
                &[("Name", "Brain"), ("Hostile", "false"), ("Wanders", "false")],
            ),
            entry("part", &[("Name", "Brain"), ("Hostile", "true"), ("Factions", "Prey-100")]),
        ]);
        let brain = bag.instance("part", "Brain").unwrap();
        // earlier value wins, later-only fields merge in
        assert_eq!(brain.get("Hostile"), Some(&"false".to_string()));
        assert_eq!(brain.get("Wanders"), Some(&"false".to_string()));
        assert_eq!(brain.get("Factions"), Some(&"Prey-100".to_string()));
    }

    #[test]
    fn test_marker_classification() {
        assert_eq!(FieldMarker::classify("*noinherit"), Some(FieldMarker::NoInherit));
        assert_eq!(FieldMarker::classify("*delete"), Some(FieldMarker::Delete));
        assert_eq!(FieldMarker::classify("ordinary"), None);
        assert_eq!(FieldMarker::classify(""), None);
    }
}
