//! Image codec trait and shared error type.
//!
//! The [`ImageCodec`] trait defines the two byte-level operations the resize
//! pipeline needs: decode raw file bytes into a raster, and encode a raster
//! back into bytes for a given [`FormatDescriptor`].
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec). Tests substitute a mock to
//! inject failures at either step.

use super::formats::{FormatDescriptor, ImageKind};
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Trait for image codecs.
///
/// Implementations must be usable from several pipeline runs at once, hence
/// the `Sync` bound.
pub trait ImageCodec: Sync {
    /// Decode bytes, detecting the encoding from their content.
    ///
    /// Returns the raster and the kind that was actually found, which may
    /// differ from what the file's extension claims.
    fn decode(&self, bytes: &[u8]) -> Result<(DynamicImage, ImageKind), CodecError>;

    /// Encode a raster per the descriptor. Same input, same bytes.
    fn encode(
        &self,
        image: &DynamicImage,
        descriptor: &FormatDescriptor,
    ) -> Result<Vec<u8>, CodecError>;
}
