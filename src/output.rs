//! PNG output and file path generation

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Save an RGBA image to a PNG file, creating parent directories if they
/// don't exist.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Output path for one rendered tile.
///
/// Record names may contain spaces and other filesystem-hostile
/// characters; they are flattened to `_`. Variant 0 is the primary tile
/// and gets a bare name; alternates get a `_vN` suffix.
///
/// | Record | Variant | Output |
/// |--------|---------|--------|
/// | Snapjaw Scavenger | 0 | `dir/Snapjaw_Scavenger.png` |
/// | Snapjaw Scavenger | 2 | `dir/Snapjaw_Scavenger_v2.png` |
pub fn tile_output_path(dir: &Path, record: &str, variant: usize) -> PathBuf {
    let safe: String = record
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let file = if variant == 0 {
        format!("{safe}.png")
    } else {
        format!("{safe}_v{variant}.png")
    };
    dir.join(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deep/tile.png");
        let image = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        save_png(&image, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_tile_output_path_primary() {
        let path = tile_output_path(Path::new("out"), "Snapjaw Scavenger", 0);
        assert_eq!(path, PathBuf::from("out/Snapjaw_Scavenger.png"));
    }

    #[test]
    fn test_tile_output_path_variant() {
        let path = tile_output_path(Path::new("out"), "Witchwood Tree", 2);
        assert_eq!(path, PathBuf::from("out/Witchwood_Tree_v2.png"));
    }
}
