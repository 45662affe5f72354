//! Filename validation for the flat image store.
//!
//! Clients address stored images by bare filename. Before a name is joined to
//! the storage directory it goes through [`sanitize`], which either returns
//! the name unchanged as a [`SafeName`] or rejects it outright. There is no
//! partial cleanup: `"../photo.png"` is an error, never `"photo.png"`.
//!
//! ## Accepted names
//!
//! - `photo.png`, `IMG_0001.JPG`, `my photo (1).webp`
//!
//! ## Rejected names
//!
//! - empty, or longer than [`MAX_NAME_LEN`] bytes
//! - any `/` or `\` (`a/b.png`, `..\x.png`)
//! - any `..` (`../../etc/passwd`, `a..png`)
//! - absolute or drive forms (`/etc/passwd`, `C:photo.png`), and any `:`
//! - control characters, including NUL
//! - a leading `.` (hidden files, and the store's own temp files)
//! - no extension (`README`, `photo.`) or no stem

use std::fmt;
use std::path::{Component, Path};
use thiserror::Error;

/// Longest accepted filename, in bytes. Matches common filesystem limits.
pub const MAX_NAME_LEN: usize = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid filename {name:?}: {reason}")]
pub struct FilenameError {
    pub name: String,
    pub reason: &'static str,
}

/// A filename that is safe to join directly onto the storage directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeName(String);

impl SafeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text after the final `.`; never empty.
    pub fn extension(&self) -> &str {
        self.0.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
    }
}

impl AsRef<Path> for SafeName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for SafeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a client-supplied filename.
pub fn sanitize(raw: &str) -> Result<SafeName, FilenameError> {
    let reject = |reason| {
        Err(FilenameError {
            name: raw.to_string(),
            reason,
        })
    };

    if raw.is_empty() {
        return reject("name is empty");
    }
    if raw.len() > MAX_NAME_LEN {
        return reject("name is too long");
    }
    if raw.contains('/') || raw.contains('\\') {
        return reject("path separators are not allowed");
    }
    if raw.contains("..") {
        return reject("parent directory references are not allowed");
    }
    if raw.contains(':') {
        return reject("drive or stream syntax is not allowed");
    }
    if raw.chars().any(char::is_control) {
        return reject("control characters are not allowed");
    }
    if raw.starts_with('.') {
        return reject("hidden names are not allowed");
    }

    match raw.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {}
        _ => return reject("name has no extension"),
    }

    // Belt and braces: the name must parse as exactly one plain component.
    let mut components = Path::new(raw).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == raw => {}
        _ => return reject("name does not resolve inside the storage directory"),
    }

    Ok(SafeName(raw.to_string()))
}
