//! Tile spec derivation: from resolved attributes to color parameters
//!
//! A [`TileSpec`] is a pure function of a record's resolved bag (plus the
//! record name, for two filename special cases). No bitmap access happens
//! here; the rasterizer consumes the spec.

use crate::bag::{AttributeBag, FieldMarker};
use crate::color::ColorSpec;
use crate::palette::{TransparencyKey, DEFAULT_FOREGROUND};

/// Hologram-material part names that force the hologram palette.
const HOLOGRAM_PARTS: &[&str] = &[
    "HologramMaterial",
    "HologramWallMaterial",
    "HologramMaterialPrimary",
];

/// Record rendered as a hologram without carrying a hologram part.
const HOLOGRAM_EXCEPTION_RECORD: &str = "Wraith-Knight Templar";

/// Record whose painted-wall extension override is ignored.
const PAINTED_EXTENSION_EXCEPTION_RECORD: &str = "Dirt";

/// Which derivation rule produced the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Normal,
    Hologram,
    StasisField,
    PaintedWall,
    PaintedFence,
}

/// Color and geometry parameters for rendering one record's tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSpec {
    /// Record the spec was derived for (diagnostics only).
    pub record: String,
    pub sprite_path: String,
    pub base_color: char,
    /// `None` tracks detail-color omission; some object categories
    /// legitimately omit it.
    pub detail_color: Option<char>,
    pub transparency: TransparencyKey,
    pub variant_kind: VariantKind,
}

/// Derive the primary tile spec for a record.
///
/// Returns `None` for records with no sprite reference and for abstract
/// base records (`tag_BaseObject` present - presence, not truthiness).
///
/// Rule precedence, first match wins: hologram, stasis field, painted
/// wall, painted fence, normal.
pub fn derive(name: &str, bag: &AttributeBag) -> Option<TileSpec> {
    let render_tile = bag.field("part", "Render", "Tile")?;
    if bag.instance("tag", "BaseObject").is_some() {
        return None;
    }

    let is_hologram = HOLOGRAM_PARTS
        .iter()
        .any(|part| bag.instance("part", part).is_some())
        || name == HOLOGRAM_EXCEPTION_RECORD;

    if is_hologram {
        return Some(TileSpec {
            record: name.to_string(),
            sprite_path: render_tile.to_string(),
            base_color: 'B',
            detail_color: Some('b'),
            transparency: TransparencyKey::Transparent,
            variant_kind: VariantKind::Hologram,
        });
    }

    if bag.instance("part", "AnimatedMaterialStasisfield").is_some() {
        return Some(TileSpec {
            record: name.to_string(),
            sprite_path: render_tile.to_string(),
            base_color: 'C',
            detail_color: Some('M'),
            transparency: TransparencyKey::Code('M'),
            variant_kind: VariantKind::StasisField,
        });
    }

    let color_string = parse_field_color(bag, "ColorString");
    let tile_color = parse_field_color(bag, "TileColor");
    let base_color = tile_color
        .or(color_string)
        .unwrap_or_default()
        .foreground_or(DEFAULT_FOREGROUND);
    let detail_color = parse_field_color(bag, "DetailColor").and_then(|spec| spec.foreground);

    // painted surfaces synthesize their sprite path from the paint id;
    // without a detail color the transparency falls back to the color
    // string's background component
    let fallback_transparency = || match (detail_color, color_string.and_then(|c| c.background)) {
        (None, Some(background)) => TransparencyKey::Code(background),
        _ => TransparencyKey::Transparent,
    };

    if let Some(paint) = painted_value(bag, "PaintedWall") {
        let atlas = bag
            .field("tag", "PaintedWallAtlas", "Value")
            .unwrap_or("Tiles/");
        let extension = painted_extension(
            bag,
            "PaintedWallExtension",
            name == PAINTED_EXTENSION_EXCEPTION_RECORD,
        );
        return Some(TileSpec {
            record: name.to_string(),
            sprite_path: format!("{atlas}{paint}-00000000{extension}"),
            base_color,
            detail_color,
            transparency: fallback_transparency(),
            variant_kind: VariantKind::PaintedWall,
        });
    }

    if let Some(paint) = painted_value(bag, "PaintedFence") {
        let atlas = bag
            .field("tag", "PaintedFenceAtlas", "Value")
            .unwrap_or("Tiles/");
        let extension = painted_extension(bag, "PaintedFenceExtension", false);
        return Some(TileSpec {
            record: name.to_string(),
            sprite_path: format!("{atlas}{paint}_{extension}"),
            base_color,
            detail_color,
            transparency: fallback_transparency(),
            variant_kind: VariantKind::PaintedFence,
        });
    }

    Some(TileSpec {
        record: name.to_string(),
        sprite_path: render_tile.to_string(),
        base_color,
        detail_color,
        transparency: TransparencyKey::Transparent,
        variant_kind: VariantKind::Normal,
    })
}

/// Derive the primary spec plus one spec per alternate sprite.
///
/// Alternate sprites come from the comma-separated
/// `part_RandomTile_Tiles` list and share the primary spec's colors.
pub fn derive_all(name: &str, bag: &AttributeBag) -> Vec<TileSpec> {
    let Some(primary) = derive(name, bag) else {
        return Vec::new();
    };

    let mut specs = vec![primary];
    if let Some(alternates) = bag.field("part", "RandomTile", "Tiles") {
        for sprite in alternates.split(',') {
            let sprite = sprite.trim();
            if sprite.is_empty() || sprite == specs[0].sprite_path {
                continue;
            }
            let mut spec = specs[0].clone();
            spec.sprite_path = sprite.to_string();
            specs.push(spec);
        }
    }
    specs
}

/// A painted-surface tag's paint id, unless the tag is absent or disabled
/// with the `*delete` marker.
fn painted_value<'a>(bag: &'a AttributeBag, tag: &str) -> Option<&'a str> {
    let value = bag.field("tag", tag, "Value")?;
    match FieldMarker::classify(value) {
        Some(FieldMarker::Delete) => None,
        _ => Some(value),
    }
}

/// Extension override for painted surfaces; empty or ignored overrides
/// fall back to `.bmp`.
fn painted_extension<'a>(bag: &'a AttributeBag, tag: &str, ignore_override: bool) -> &'a str {
    match bag.field("tag", tag, "Value") {
        Some(ext) if !ext.is_empty() && !ignore_override => ext,
        _ => ".bmp",
    }
}

/// Parse one of the Render color fields into a code pair, ignoring
/// malformed strings (bad color data degrades a tile, never the load).
fn parse_field_color(bag: &AttributeBag, field: &str) -> Option<ColorSpec> {
    bag.field("part", "Render", field)
        .and_then(|raw| ColorSpec::parse(raw).ok())
}
