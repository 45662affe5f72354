//! Image processing: decode, resize, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Format lookup** | static extension table ([`formats`]) |
//! | **Decode** | `image` crate, encoding sniffed from magic bytes |
//! | **Resize** | `resize_exact` with bilinear (`Triangle`) filter |
//! | **Encode** | `image` encoders (PNG, JPEG, BMP) + `webp` (lossy WebP) |
//!
//! The module is split into:
//! - **Formats**: the registry of supported extensions and their encode parameters
//! - **Parameters**: [`Quality`] and [`Dimensions`]
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: pure pixel operations (resize)

pub mod backend;
pub mod formats;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{CodecError, ImageCodec};
pub use formats::{FormatDescriptor, ImageKind, UnsupportedFormat};
pub use operations::resize;
pub use params::{Dimensions, LOSSY_QUALITY, Quality};
pub use rust_backend::RustCodec;
