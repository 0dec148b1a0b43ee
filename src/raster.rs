//! Tile rasterization: recoloring shared sprites per tile spec
//!
//! Source sprites are loaded once into a path-keyed cache and recolored
//! per record on a private copy - one sprite file serves many differently
//! colored records. Degraded outcomes (missing file, colors the
//! base/detail substitution model can't express) are carried on the
//! produced tile as a status, never as an error.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

use crate::palette::{self, DEFAULT_DETAIL, DETAIL_MASK, TILE_MASK};
use crate::tilespec::TileSpec;

/// Placeholder tile dimensions, matching the standard sprite size.
pub const PLACEHOLDER_WIDTH: u32 = 16;
pub const PLACEHOLDER_HEIGHT: u32 = 24;

/// Fixed factor for the export-size raster.
pub const EXPORT_SCALE: u32 = 10;

/// Outcome of rasterizing one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    Ok,
    /// Sprite file not found; the tile is a blank placeholder.
    MissingSprite,
    /// The sprite needs the blended color channel but the record never
    /// specified a detail color; the tile is produced but unsuitable for
    /// publication.
    UndecomposableColor,
}

/// A recolored tile plus its degradation status.
#[derive(Debug, Clone)]
pub struct RenderedTile {
    pub pixels: RgbaImage,
    pub source_sprite: String,
    pub status: TileStatus,
}

impl RenderedTile {
    /// Export-size raster: a pure nearest-neighbor enlargement of the
    /// colored result, no further recoloring.
    pub fn enlarged(&self) -> RgbaImage {
        let (w, h) = self.pixels.dimensions();
        image::imageops::resize(
            &self.pixels,
            w * EXPORT_SCALE,
            h * EXPORT_SCALE,
            FilterType::Nearest,
        )
    }
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Loaded(Arc<RgbaImage>),
    /// Missing files are cached too so repeated lookups skip the
    /// filesystem.
    Missing,
}

/// Recolors sprites per [`TileSpec`], caching decoded bitmaps by path.
///
/// Shared across threads: rasterization fans out per record while the
/// cache and the undecomposable-sprite set sit behind mutexes.
#[derive(Debug)]
pub struct TileRasterizer {
    tiles_dir: PathBuf,
    cache: Mutex<HashMap<String, CacheEntry>>,
    undecomposable: Mutex<HashSet<String>>,
}

impl TileRasterizer {
    /// Create a rasterizer reading sprites from `tiles_dir`.
    pub fn new(tiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            tiles_dir: tiles_dir.into(),
            cache: Mutex::new(HashMap::new()),
            undecomposable: Mutex::new(HashSet::new()),
        }
    }

    /// Recolor the spec's sprite into a tile.
    ///
    /// Pixel substitution on a private copy of the cached bitmap:
    /// - the reserved base mask becomes the spec's base color;
    /// - the reserved detail mask becomes the spec's detail color;
    /// - fully transparent pixels become the transparency fill;
    /// - anything else is the blended channel: its red value is the
    ///   0-255 detail weight between base and detail, alpha forced
    ///   opaque.
    ///
    /// A blended pixel on a spec with no declared detail color flags the
    /// tile `UndecomposableColor` and remembers the sprite, so later
    /// detail-less records sharing it are flagged up front.
    pub fn rasterize(&self, spec: &TileSpec) -> RenderedTile {
        let Some(source) = self.load(&spec.sprite_path) else {
            return RenderedTile {
                pixels: placeholder(),
                source_sprite: spec.sprite_path.clone(),
                status: TileStatus::MissingSprite,
            };
        };

        let base = palette::color_or_default(spec.base_color);
        let detail = palette::color_or_default(spec.detail_color.unwrap_or(DEFAULT_DETAIL));
        let transparency = spec.transparency.fill();

        let mut status = TileStatus::Ok;
        if spec.detail_color.is_none()
            && lock(&self.undecomposable).contains(&spec.sprite_path)
        {
            status = TileStatus::UndecomposableColor;
        }

        let mut pixels = (*source).clone();
        let mut hit_blend = false;
        for px in pixels.pixels_mut() {
            if *px == TILE_MASK {
                *px = base;
            } else if *px == DETAIL_MASK {
                *px = detail;
            } else if px[3] == 0 {
                *px = transparency;
            } else {
                hit_blend = true;
                let weight = px[0] as u32;
                let mix = |b: u8, d: u8| {
                    ((weight * d as u32 + (255 - weight) * b as u32) / 255) as u8
                };
                *px = Rgba([
                    mix(base[0], detail[0]),
                    mix(base[1], detail[1]),
                    mix(base[2], detail[2]),
                    255,
                ]);
            }
        }

        if hit_blend && spec.detail_color.is_none() && status == TileStatus::Ok {
            status = TileStatus::UndecomposableColor;
            lock(&self.undecomposable).insert(spec.sprite_path.clone());
        }

        RenderedTile {
            pixels,
            source_sprite: spec.sprite_path.clone(),
            status,
        }
    }

    /// Fetch a decoded sprite from the cache, loading on first use.
    fn load(&self, sprite_path: &str) -> Option<Arc<RgbaImage>> {
        let mut cache = lock(&self.cache);
        if let Some(entry) = cache.get(sprite_path) {
            return match entry {
                CacheEntry::Loaded(image) => Some(Arc::clone(image)),
                CacheEntry::Missing => None,
            };
        }

        let full_path = self.tiles_dir.join(sprite_path);
        let entry = match image::open(&full_path) {
            Ok(image) => CacheEntry::Loaded(Arc::new(image.to_rgba8())),
            Err(_) => CacheEntry::Missing,
        };
        let result = match &entry {
            CacheEntry::Loaded(image) => Some(Arc::clone(image)),
            CacheEntry::Missing => None,
        };
        cache.insert(sprite_path.to_string(), entry);
        result
    }
}

/// Blank opaque placeholder for missing sprites.
fn placeholder() -> RgbaImage {
    RgbaImage::from_pixel(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, Rgba([0, 0, 0, 255]))
}

/// Lock a mutex, recovering the guard if a panicking thread poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
