//! # cdn-resize
//!
//! In-place, format-aware resizing for a file-hosting service's image store.
//! Given a stored filename and a target size, the crate locates the file
//! safely, decodes it, resizes it, re-encodes it in its own format, and swaps
//! the new bytes in atomically.
//!
//! # Architecture: One Straight-Line Pipeline
//!
//! ```text
//! ResizeRequest { filename, width, height }
//!   1. validate dimensions
//!   2. naming::sanitize         (reject traversal, separators, no extension)
//!   3. formats::resolve         (extension → FormatDescriptor)
//!   4. lock filename, read      (storage::ImageStore)
//!   5. decode                   (ImageCodec, encoding sniffed from bytes)
//!   6. resize                   (exact size, bilinear)
//!   7. encode                   (claimed format, fixed quality)
//!   8. atomic replace, unlock   (temp file + rename)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | `ResizePipeline`, the entry point, and error kinds |
//! | [`naming`] | Filename validation: the only way a client string becomes a path |
//! | [`imaging`] | Format registry, codec trait and implementation, resize |
//! | [`storage`] | Flat image directory: classified reads, atomic replace |
//! | [`locks`] | Reference-counted per-filename lock table |
//! | [`settings`] | Key-value `ConfigStore` and the typed settings read from it |
//! | [`config`] | `config.toml` loading, validation, stock defaults |
//! | [`output`] | CLI output formatting: text lines and JSON responses |
//!
//! # Design Decisions
//!
//! ## Never Partially Written
//!
//! The stored file may be served to clients while it is being resized. New
//! bytes are written to a temp file in the same directory and renamed over
//! the original, so a reader sees either the old image or the new one. Every
//! earlier step only reads, so any failure leaves the file untouched.
//!
//! ## One Lock Per Filename
//!
//! Two resizes of the same file would otherwise both decode the old bytes and
//! race to rename. [`locks::KeyedLocks`] serializes them without a global
//! lock; entries disappear once nobody holds or waits on them.
//!
//! ## A Static Format Table
//!
//! The supported formats and their encode parameters live in one table
//! ([`imaging::formats`]). JPEG and WebP use a fixed quality of 75 so output
//! sizes are predictable; clients cannot tune it.
//!
//! ## Explicit Storage Root
//!
//! The storage directory is passed into [`pipeline::ResizePipeline`] at
//! construction rather than read from a global, so tests run against
//! temporary directories.

pub mod config;
pub mod imaging;
pub mod locks;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod settings;
pub mod storage;

pub use pipeline::{ErrorKind, ResizeError, ResizeOutcome, ResizePipeline, ResizeRequest};

#[cfg(test)]
pub(crate) mod test_helpers;
