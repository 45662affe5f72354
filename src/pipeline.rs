//! The resize pipeline: the one entry point for resizing a stored image.
//!
//! ```text
//! validate dims → sanitize name → resolve format → lock(name)
//!     → read → decode → resize → encode → atomic replace → unlock
//! ```
//!
//! Every step before the final rename only reads from disk or works on
//! in-memory buffers, so a failure anywhere leaves the stored file exactly
//! as it was. The per-filename lock is taken before the read and released
//! after the rename; concurrent requests for the same file are serialized,
//! requests for different files run fully in parallel.
//!
//! ## Claimed vs. detected format
//!
//! The output is always encoded as the format named by the file's extension,
//! even when the stored bytes turn out to be something else (a JPEG saved as
//! `photo.png` comes back as a real PNG). The mismatch is logged.

use crate::config::{LimitsConfig, ServiceConfig};
use crate::imaging::{
    CodecError, Dimensions, FormatDescriptor, ImageCodec, ImageKind, RustCodec,
    UnsupportedFormat, formats, resize,
};
use crate::locks::KeyedLocks;
use crate::naming::{self, FilenameError};
use crate::storage::{ImageStore, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A request to resize one stored image in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRequest {
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

impl ResizeRequest {
    pub fn new(filename: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            filename: filename.into(),
            width,
            height,
        }
    }
}

/// What a successful resize did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResizeOutcome {
    pub filename: String,
    /// Encoding actually found in the stored bytes.
    pub detected: ImageKind,
    /// Encoding written back (always the extension's format).
    pub written: ImageKind,
    pub source: Dimensions,
    pub target: Dimensions,
    pub bytes_written: usize,
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidRequest,
    InvalidFilename,
    UnsupportedFormat,
    NotFound,
    DecodeFailure,
    EncodeFailure,
    StorageError,
}

impl ErrorKind {
    /// Only storage failures are worth retrying: nothing partial is ever
    /// visible, and the cause may be transient.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::StorageError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    InvalidFilename(#[from] FilenameError),
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ResizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::InvalidFilename(_) => ErrorKind::InvalidFilename,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::Codec(CodecError::Decode(_)) => ErrorKind::DecodeFailure,
            Self::Codec(CodecError::Encode(_)) => ErrorKind::EncodeFailure,
            Self::Storage(StorageError::NotFound(_)) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::StorageError,
        }
    }
}

/// Resizes images in one storage directory.
///
/// Generic over the codec so tests can inject failures; production code uses
/// [`RustCodec`].
pub struct ResizePipeline<C = RustCodec> {
    store: ImageStore,
    codec: C,
    limits: LimitsConfig,
    locks: KeyedLocks,
}

impl ResizePipeline<RustCodec> {
    /// Build the production pipeline for the configured image directory.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            ImageStore::new(config.storage.images_path()),
            RustCodec::new(),
            config.limits.clone(),
        )
    }
}

impl<C: ImageCodec> ResizePipeline<C> {
    pub fn new(store: ImageStore, codec: C, limits: LimitsConfig) -> Self {
        Self {
            store,
            codec,
            limits,
            locks: KeyedLocks::new(),
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Number of filenames currently locked or waited on.
    pub fn locked_files(&self) -> usize {
        self.locks.len()
    }

    fn validate_dimensions(&self, request: &ResizeRequest) -> Result<Dimensions, ResizeError> {
        let target = Dimensions::new(request.width, request.height);
        if target.is_empty() {
            return Err(ResizeError::InvalidRequest(format!(
                "width and height must be positive, got {target}"
            )));
        }
        let max = self.limits.max_dimension;
        if target.width > max || target.height > max {
            return Err(ResizeError::InvalidRequest(format!(
                "width and height must not exceed {max}, got {target}"
            )));
        }
        Ok(target)
    }

    /// Resize the stored file named in `request`, replacing it atomically.
    pub fn resize(&self, request: &ResizeRequest) -> Result<ResizeOutcome, ResizeError> {
        let target = self.validate_dimensions(request)?;

        let name = naming::sanitize(&request.filename).inspect_err(|e| {
            tracing::warn!(
                filename = %request.filename,
                reason = e.reason,
                "rejected unsafe filename"
            );
        })?;
        let descriptor: &FormatDescriptor = formats::resolve(name.extension())?;

        let _guard = self.locks.lock(name.as_str());
        tracing::debug!(file = %name, %target, "resizing");

        let original = self.store.read(&name)?;
        let (image, detected) = self.codec.decode(&original)?;
        if detected != descriptor.kind {
            tracing::warn!(
                file = %name,
                %detected,
                claimed = %descriptor.kind,
                "stored bytes do not match extension, re-encoding as claimed format"
            );
        }
        let source = Dimensions::of(&image);

        let resized = resize(&image, target);
        drop(image);
        let encoded = self.codec.encode(&resized, descriptor)?;

        self.store.replace(&name, &encoded)?;
        tracing::info!(
            file = %name,
            from = %source,
            to = %target,
            bytes = encoded.len(),
            "resized"
        );

        Ok(ResizeOutcome {
            filename: name.to_string(),
            detected,
            written: descriptor.kind,
            source,
            target,
            bytes_written: encoded.len(),
        })
    }
}
