//! Pure Rust codec built on the `image` crate, plus `libwebp` for lossy WebP.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff encoding | `image::guess_format` (magic bytes) |
//! | Decode (PNG, JPEG, BMP, WebP) | `image::load_from_memory_with_format` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (fixed quality, RGB8) |
//! | Encode → BMP | `image::codecs::bmp::BmpEncoder` (RGB8 / RGBA8) |
//! | Encode → WebP | `webp::Encoder` (lossy, fixed quality) |
//!
//! None of these encoders write timestamps, so output is a pure function of
//! pixels and descriptor.

use super::backend::{CodecError, ImageCodec};
use super::formats::{self, FormatDescriptor, ImageKind};
use super::params::{Dimensions, Quality};
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use std::io::Cursor;

/// Codec backed by the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that a descriptor agrees with the registry and carries a quality
/// exactly when its kind is lossy.
fn encode_quality(descriptor: &FormatDescriptor) -> Result<Option<Quality>, CodecError> {
    let registered = formats::resolve(descriptor.extension).map(|d| d.kind);
    if registered != Ok(descriptor.kind) {
        return Err(CodecError::Encode(format!(
            "Descriptor for .{} does not describe {}",
            descriptor.extension, descriptor.kind
        )));
    }
    match (descriptor.kind.is_lossy(), descriptor.quality) {
        (true, Some(quality)) => Ok(Some(quality)),
        (false, None) => Ok(None),
        (true, None) => Err(CodecError::Encode(format!(
            "{} requires a quality setting",
            descriptor.kind
        ))),
        (false, Some(_)) => Err(CodecError::Encode(format!(
            "{} is lossless and takes no quality setting",
            descriptor.kind
        ))),
    }
}

fn encode_webp(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
    let q = quality.value() as f32;
    let encoded = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode_simple(false, q)
            .map(|mem| mem.to_vec())
    } else {
        let rgb = image.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
            .encode_simple(false, q)
            .map(|mem| mem.to_vec())
    };
    encoded.map_err(|e| CodecError::Encode(format!("WebP encode failed: {e:?}")))
}

impl ImageCodec for RustCodec {
    fn decode(&self, bytes: &[u8]) -> Result<(DynamicImage, ImageKind), CodecError> {
        let format = image::guess_format(bytes)
            .map_err(|e| CodecError::Decode(format!("Unrecognized image encoding: {e}")))?;
        let kind = formats::kind_of(format).ok_or_else(|| {
            CodecError::Decode(format!("Unsupported image encoding: {format:?}"))
        })?;
        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| CodecError::Decode(format!("Failed to decode {kind}: {e}")))?;
        Ok((image, kind))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        descriptor: &FormatDescriptor,
    ) -> Result<Vec<u8>, CodecError> {
        let dims = Dimensions::of(image);
        if dims.is_empty() {
            return Err(CodecError::Encode(format!(
                "Cannot encode a zero-area image ({dims})"
            )));
        }
        let quality = encode_quality(descriptor)?;

        let mut buf = Cursor::new(Vec::new());
        let written = match (descriptor.kind, quality) {
            (ImageKind::Png, _) => image.write_with_encoder(PngEncoder::new(&mut buf)),
            (ImageKind::Jpeg, Some(q)) => {
                // JPEG has no alpha channel
                let encoder = JpegEncoder::new_with_quality(&mut buf, q.value() as u8);
                image.to_rgb8().write_with_encoder(encoder)
            }
            (ImageKind::Bmp, _) => {
                let encoder = BmpEncoder::new(&mut buf);
                if image.color().has_alpha() {
                    image.to_rgba8().write_with_encoder(encoder)
                } else {
                    image.to_rgb8().write_with_encoder(encoder)
                }
            }
            (ImageKind::WebP, Some(q)) => return encode_webp(image, q),
            (kind, None) => {
                return Err(CodecError::Encode(format!(
                    "{kind} requires a quality setting"
                )));
            }
        };
        written.map_err(|e| {
            CodecError::Encode(format!("{} encode failed: {e}", descriptor.kind))
        })?;
        Ok(buf.into_inner())
    }
}
