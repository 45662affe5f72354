//! Shared test utilities: synthetic rasters and stored-image fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! store_fixture(tmp.path(), "photo.png", ImageFormat::Png, 100, 100);
//! assert_eq!(stored_dimensions(&tmp.path().join("photo.png")), (100, 100));
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// An RGB gradient, so resampling has something to interpolate.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode a gradient with the `image` crate's own encoder for `format`.
pub fn encode_fixture(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

// =========================================================================
// Storage fixtures
// =========================================================================

/// Write an encoded gradient into `dir` under `name`; returns the bytes.
pub fn store_fixture(
    dir: &Path,
    name: &str,
    format: ImageFormat,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let bytes = encode_fixture(format, width, height);
    std::fs::write(dir.join(name), &bytes).unwrap();
    bytes
}

/// Decode a stored file (sniffing its content, not its extension) and
/// return its dimensions. Panics if undecodable.
pub fn stored_dimensions(path: &Path) -> (u32, u32) {
    let img = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .unwrap()
        .decode()
        .unwrap_or_else(|e| panic!("failed to decode {}: {e}", path.display()));
    (img.width(), img.height())
}

/// Names of every entry in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
