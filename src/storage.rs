//! The flat on-disk image store.
//!
//! One directory, addressed only by [`SafeName`]. Reads classify "missing"
//! apart from other I/O failures; writes go through [`ImageStore::replace`],
//! which never exposes a partially-written file.
//!
//! ## Atomic replace
//!
//! ```text
//! images/.resize-XXXXXX.tmp   ← write + fsync new bytes here
//! images/photo.png            ← rename(tmp, photo.png)
//! ```
//!
//! The temp file lives in the same directory as its target so the rename
//! never crosses a filesystem. If anything fails before the rename, the
//! `NamedTempFile` is dropped and deletes itself.

use crate::naming::SafeName;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Prefix for in-flight temp files. `naming::sanitize` rejects leading dots,
/// so clients can never address one.
pub const TEMP_PREFIX: &str = ".resize-";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// A single flat directory of stored images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &SafeName) -> PathBuf {
        self.dir.join(name)
    }

    pub fn read(&self, name: &SafeName) -> Result<Vec<u8>, StorageError> {
        let path = self.path_of(name);
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path),
            _ => StorageError::Read { path, source: e },
        })
    }

    /// Atomically replace the contents of `name` with `bytes`.
    ///
    /// The new file keeps the permissions of the one it replaces.
    pub fn replace(&self, name: &SafeName, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.path_of(name);
        let write_err = |source| StorageError::Write {
            path: target.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        copy_permissions(&target, &tmp).map_err(write_err)?;

        tmp.persist(&target).map_err(|e| write_err(e.error))?;
        sync_dir(&self.dir);
        Ok(())
    }
}

fn copy_permissions(from: &Path, to: &NamedTempFile) -> io::Result<()> {
    match fs::metadata(from) {
        Ok(meta) => fs::set_permissions(to.path(), meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Flush the directory entry for the rename. Best effort: not every
/// platform lets a directory be opened for syncing.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}
