//! End-to-end tests: definition stream -> registry -> resolved queries

use std::io::Cursor;

use tileforge::parser::parse_stream;
use tileforge::path::{self, AttributePath};
use tileforge::registry::{BlueprintRegistry, LoadError};

/// A small but representative slice of a definition file: a root, a
/// couple of base records, the farmer chain, and the sentinel cases.
const DEFINITIONS: &str = r#"
// root
{name: "Object", entries: [
    {category: "part", fields: {Name: "Physics", Solid: "false", Weight: "0"}},
]}

{name: "PhysicalObject", inherits: "Object", entries: [
    {category: "part", fields: {Name: "Render", Tile: "Items/sw_generic.bmp", ColorString: "&y", RenderLayer: "1"}},
    {category: "tag", fields: {Name: "Gender", Value: "neuter"}},
]}

{name: "NPC", inherits: "PhysicalObject", entries: [
    {category: "part", fields: {Name: "Render", Tile: "Creatures/sw_npc.bmp"}},
    {category: "part", fields: {Name: "Brain", Hostile: "false"}},
    {category: "stat", fields: {Name: "Strength", sValue: "16,1d4"}},
    {category: "tag", fields: {Name: "Flammable", Value: "*noinherit"}},
]}

{name: "BaseFarmer", inherits: "NPC", entries: [
    {category: "part", fields: {Name: "Render", DisplayName: "[farmer]"}},
    {category: "xtagGrammar", fields: {Proper: "false"}},
]}

{name: "BaseWatervineFarmer", inherits: "BaseFarmer", entries: [
    {category: "part", fields: {Name: "Render", DisplayName: "watervine farmer"}},
    {category: "inventoryobject", fields: {Blueprint: "Vinereaper", Number: "1"}},
]}
"#;

fn load() -> BlueprintRegistry {
    let parsed = parse_stream(Cursor::new(DEFINITIONS));
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    BlueprintRegistry::from_descriptors(&parsed.records)
        .unwrap()
        .registry
}

fn query<'a>(registry: &'a BlueprintRegistry, record: &str, path_text: &str) -> Option<&'a str> {
    let bag = registry.get(record).unwrap().resolved().unwrap();
    path::query_field(bag, &AttributePath::parse(path_text).unwrap())
}

#[test]
fn test_full_chain_resolution() {
    let registry = load();
    assert_eq!(registry.len(), 5);

    // child override wins over the whole chain
    assert_eq!(
        query(&registry, "BaseWatervineFarmer", "part_Render_DisplayName"),
        Some("watervine farmer")
    );
    // tile comes through from NPC, unmodified by either farmer record
    assert_eq!(
        query(&registry, "BaseWatervineFarmer", "part_Render_Tile"),
        Some("Creatures/sw_npc.bmp")
    );
    // root attributes reach the leaves
    assert_eq!(
        query(&registry, "BaseWatervineFarmer", "part_Physics_Solid"),
        Some("false")
    );
}

#[test]
fn test_backfill_keeps_sibling_fields() {
    let registry = load();
    // NPC overrides Render.Tile but inherits RenderLayer from PhysicalObject
    assert_eq!(query(&registry, "NPC", "part_Render_RenderLayer"), Some("1"));
    assert_eq!(
        query(&registry, "NPC", "part_Render_ColorString"),
        Some("&y")
    );
}

#[test]
fn test_noinherit_cuts_descendants_only() {
    let registry = load();
    // the record that wrote the sentinel keeps the raw value
    assert_eq!(
        query(&registry, "NPC", "tag_Flammable_Value"),
        Some("*noinherit")
    );
    // descendants lose the whole instance
    for name in ["BaseFarmer", "BaseWatervineFarmer"] {
        let bag = registry.get(name).unwrap().resolved().unwrap();
        assert!(bag.instance("tag", "Flammable").is_none(), "{name}");
    }
}

#[test]
fn test_xtag_and_inventoryobject_instances() {
    let registry = load();
    assert_eq!(
        query(&registry, "BaseFarmer", "xtag_Grammar_Proper"),
        Some("false")
    );
    assert_eq!(
        query(
            &registry,
            "BaseWatervineFarmer",
            "inventoryobject_Vinereaper_Number"
        ),
        Some("1")
    );
    // xtags inherit like everything else
    assert_eq!(
        query(&registry, "BaseWatervineFarmer", "xtag_Grammar_Proper"),
        Some("false")
    );
}

#[test]
fn test_local_versus_inherited() {
    let registry = load();
    let id = registry.id("BaseWatervineFarmer").unwrap();
    let display = AttributePath::parse("part_Render_DisplayName").unwrap();
    let tile = AttributePath::parse("part_Render_Tile").unwrap();
    assert!(path::is_locally_specified(&registry, id, &display));
    assert!(!path::is_locally_specified(&registry, id, &tile));
}

#[test]
fn test_ancestry_and_lineage() {
    let registry = load();
    let farmer = registry.id("BaseWatervineFarmer").unwrap();
    assert!(path::inherits_from(&registry, farmer, "NPC"));
    assert!(path::inherits_from(&registry, farmer, "Object"));
    assert!(!path::inherits_from(&registry, farmer, "BaseScorpion"));
    assert_eq!(
        path::lineage(&registry, farmer).join(" > "),
        "Object > PhysicalObject > NPC > BaseFarmer > BaseWatervineFarmer"
    );
}

#[test]
fn test_absent_paths_are_not_errors() {
    let registry = load();
    assert_eq!(query(&registry, "NPC", "part_Render_Missing"), None);
    assert_eq!(query(&registry, "NPC", "tag_NoSuchTag_Value"), None);
    assert_eq!(query(&registry, "Object", "intproperty_Anything_Value"), None);
}

#[test]
fn test_unknown_parent_aborts_load() {
    let input = concat!(
        r#"{"name": "Object"}"#,
        "\n",
        r#"{"name": "Stray", "inherits": "NotDefinedYet"}"#,
        "\n",
    );
    let parsed = parse_stream(Cursor::new(input));
    let err = BlueprintRegistry::from_descriptors(&parsed.records).unwrap_err();
    assert_eq!(
        err,
        LoadError::UnknownParent {
            record: "Stray".to_string(),
            parent: "NotDefinedYet".to_string(),
        }
    );
}

#[test]
fn test_stat_dice_strings_flow_to_dice_parser() {
    use tileforge::dice::DiceExpression;

    let registry = load();
    // the raw sValue carries the creature-stat notation; the upstream
    // consumer rewrites it to a plain dice string before analysis
    let raw = query(&registry, "NPC", "stat_Strength_sValue").unwrap();
    let rewritten = raw.replace(',', "+");
    let dice = DiceExpression::parse(&rewritten).unwrap();
    assert_eq!(dice.minimum(), 17);
    assert_eq!(dice.maximum(), 20);
    assert_eq!(dice.average(), 18);
}
