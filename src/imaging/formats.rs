//! The format registry: extension → [`FormatDescriptor`].
//!
//! Every format the store can resize is listed once in [`DESCRIPTORS`]. The
//! table is the single source of truth for which extensions are accepted and
//! how each one is re-encoded; there is no per-format branching elsewhere
//! except inside the codec itself.
//!
//! | Extension | Kind | Encode parameters |
//! |---|---|---|
//! | `png` | PNG | lossless |
//! | `jpg`, `jpeg` | JPEG | quality 75 |
//! | `bmp` | BMP | lossless |
//! | `webp` | WebP | lossy, quality 75 |

use super::params::{LOSSY_QUALITY, Quality};
use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The closed set of encodings the store supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Bmp,
    WebP,
}

impl ImageKind {
    /// Whether the encoder for this kind takes a quality parameter.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::WebP)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::WebP => "WebP",
        };
        f.write_str(name)
    }
}

/// How files with a given extension are re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    pub extension: &'static str,
    pub kind: ImageKind,
    /// Present exactly when `kind` is lossy.
    pub quality: Option<Quality>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Image of type {extension} is not supported")]
pub struct UnsupportedFormat {
    pub extension: String,
}

const DESCRIPTORS: &[FormatDescriptor] = &[
    FormatDescriptor {
        extension: "png",
        kind: ImageKind::Png,
        quality: None,
    },
    FormatDescriptor {
        extension: "jpg",
        kind: ImageKind::Jpeg,
        quality: Some(LOSSY_QUALITY),
    },
    FormatDescriptor {
        extension: "jpeg",
        kind: ImageKind::Jpeg,
        quality: Some(LOSSY_QUALITY),
    },
    FormatDescriptor {
        extension: "bmp",
        kind: ImageKind::Bmp,
        quality: None,
    },
    FormatDescriptor {
        extension: "webp",
        kind: ImageKind::WebP,
        quality: Some(LOSSY_QUALITY),
    },
];

/// All supported descriptors, in table order.
pub fn all() -> &'static [FormatDescriptor] {
    DESCRIPTORS
}

/// Look up the descriptor for an extension (case-insensitive).
pub fn resolve(extension: &str) -> Result<&'static FormatDescriptor, UnsupportedFormat> {
    DESCRIPTORS
        .iter()
        .find(|d| d.extension.eq_ignore_ascii_case(extension))
        .ok_or_else(|| UnsupportedFormat {
            extension: extension.to_string(),
        })
}

/// Map a sniffed encoding back into the registry, if it is one we support.
pub fn kind_of(format: ImageFormat) -> Option<ImageKind> {
    match format {
        ImageFormat::Png => Some(ImageKind::Png),
        ImageFormat::Jpeg => Some(ImageKind::Jpeg),
        ImageFormat::Bmp => Some(ImageKind::Bmp),
        ImageFormat::WebP => Some(ImageKind::WebP),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_supported_extension_case_insensitively() {
        for ext in ["PNG", "png", "jpg", "JPG", "jpeg", "Jpeg", "bmp", "webp", "WEBP"] {
            assert!(resolve(ext).is_ok(), "expected {ext} to resolve");
        }
    }

    #[test]
    fn jpg_and_jpeg_share_a_kind() {
        assert_eq!(resolve("jpg").unwrap().kind, ImageKind::Jpeg);
        assert_eq!(resolve("jpeg").unwrap().kind, ImageKind::Jpeg);
    }

    #[test]
    fn gif_is_unsupported_and_carries_extension() {
        let err = resolve("gif").unwrap_err();
        assert_eq!(err.extension, "gif");
        assert_eq!(err.to_string(), "Image of type gif is not supported");
    }

    #[test]
    fn unsupported_keeps_original_casing() {
        assert_eq!(resolve("TIFF").unwrap_err().extension, "TIFF");
    }

    #[test]
    fn quality_present_exactly_for_lossy_kinds() {
        for d in all() {
            assert_eq!(
                d.quality.is_some(),
                d.kind.is_lossy(),
                "inconsistent descriptor for {}",
                d.extension
            );
        }
    }

    #[test]
    fn lossy_formats_use_fixed_quality() {
        assert_eq!(resolve("jpg").unwrap().quality, Some(Quality::new(75)));
        assert_eq!(resolve("webp").unwrap().quality, Some(Quality::new(75)));
        assert_eq!(resolve("png").unwrap().quality, None);
    }

    #[test]
    fn kind_of_round_trips_through_image_format() {
        for d in all() {
            assert_eq!(kind_of(d.kind.image_format()), Some(d.kind));
        }
        assert_eq!(kind_of(ImageFormat::Gif), None);
        assert_eq!(kind_of(ImageFormat::Tiff), None);
    }
}
