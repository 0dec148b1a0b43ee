//! Fixed display palette and reserved sentinel pixel values
//!
//! Single-character color codes map to the fixed 18-entry game palette.
//! Source sprites are painted with two reserved mask values - one for the
//! "base" layer, one for the "detail" layer - which the rasterizer
//! substitutes with a record's resolved colors. A third reserved value is
//! the fill used for fully transparent source pixels.

use image::Rgba;

/// Reserved mask painted on base-layer pixels in source sprites.
pub const TILE_MASK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Reserved mask painted on detail-layer pixels in source sprites.
pub const DETAIL_MASK: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Fill for the named `transparent` key (the dark viridian the game UI
/// shows behind tiles, fully transparent in exports).
pub const TRANSPARENT_FILL: Rgba<u8> = Rgba([15, 64, 63, 0]);

/// Fallback foreground code when a record specifies no usable color.
pub const DEFAULT_FOREGROUND: char = 'y';

/// Fallback detail code when a record specifies no detail color.
pub const DEFAULT_DETAIL: char = 'Y';

/// Opaque RGBA for a single-character color code, or `None` for codes
/// outside the palette.
pub fn color(code: char) -> Option<Rgba<u8>> {
    let rgb = match code {
        'r' => [166, 74, 46],   // dark red
        'R' => [215, 66, 0],    // bright red
        'w' => [152, 135, 95],  // brown
        'W' => [207, 192, 65],  // yellow
        'c' => [64, 164, 185],  // dark cyan
        'C' => [119, 191, 207], // bright cyan
        'b' => [0, 72, 189],    // dark blue
        'B' => [0, 150, 255],   // bright blue
        'g' => [0, 148, 3],     // dark green
        'G' => [0, 196, 32],    // bright green
        'm' => [177, 84, 207],  // dark magenta
        'M' => [218, 91, 214],  // bright magenta
        'y' => [177, 201, 195], // bright grey
        'Y' => [255, 255, 255], // white
        'k' => [15, 59, 58],    // black
        'K' => [21, 83, 82],    // dark grey
        'o' => [241, 95, 34],
        'O' => [233, 159, 16],
        _ => return None,
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// Opaque RGBA for a code, falling back to the default foreground `y`.
pub fn color_or_default(code: char) -> Rgba<u8> {
    color(code).unwrap_or(Rgba([177, 201, 195, 255]))
}

/// What fills the transparent areas of a rendered tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyKey {
    /// The named `transparent` sentinel.
    Transparent,
    /// An opaque palette color (e.g. the stasis-field magenta).
    Code(char),
}

impl TransparencyKey {
    /// The RGBA value this key fills with.
    pub fn fill(&self) -> Rgba<u8> {
        match self {
            TransparencyKey::Transparent => TRANSPARENT_FILL,
            TransparencyKey::Code(code) => color(*code).unwrap_or(TRANSPARENT_FILL),
        }
    }
}
