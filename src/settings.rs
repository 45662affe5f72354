//! Key-value settings store and the typed settings read from it.
//!
//! The service keeps a small set of runtime toggles in a generic
//! [`ConfigStore`]: string keys, string values, last write wins. Two keys are
//! interpreted here:
//!
//! | Key | Meaning | Effective default |
//! |---|---|---|
//! | `registration_enabled` | `"true"` / `"false"` | enabled |
//! | `access_token_ttl` | minutes, `5..=1440` | 15 |
//!
//! Readers never fail: a missing, empty, or unusable value (or a store error)
//! falls back to the default. Writers validate before touching the store.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REGISTRATION_ENABLED_KEY: &str = "registration_enabled";
pub const ACCESS_TOKEN_TTL_KEY: &str = "access_token_ttl";

pub const MIN_ACCESS_TOKEN_TTL: i64 = 5;
pub const MAX_ACCESS_TOKEN_TTL: i64 = 1440;
pub const DEFAULT_ACCESS_TOKEN_TTL: u32 = 15;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Settings file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid request: access_token_ttl must be between 5 and 1440 minutes (got {0})")]
    TtlOutOfRange(i64),
    #[error("Failed to update config: {0}")]
    Store(#[from] StoreError),
}

/// Generic string key-value store.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store, mostly for tests and embedding.
#[derive(Default)]
pub struct MemoryConfigStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
///
/// Every `set` rewrites the whole file through a temp file and rename, so a
/// crash mid-write leaves the previous version intact.
pub struct FileConfigStore {
    path: PathBuf,
    write_lock: parking_lot::Mutex<()>,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: parking_lot::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;

        let json = serde_json::to_string_pretty(values).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }
}

/// Fetch a value, treating store errors and empty strings as absent.
fn lookup(store: &dyn ConfigStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(Some(v)) if !v.is_empty() => Some(v),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "settings store read failed, using default");
            None
        }
    }
}

/// Whether new users may register.
///
/// Enabled when unset; once set, only the exact value `"true"` enables.
pub fn registration_enabled(store: &dyn ConfigStore) -> bool {
    lookup(store, REGISTRATION_ENABLED_KEY)
        .map(|v| v == "true")
        .unwrap_or(true)
}

pub fn set_registration_enabled(
    store: &dyn ConfigStore,
    enabled: bool,
) -> Result<bool, SettingsError> {
    let value = if enabled { "true" } else { "false" };
    store.set(REGISTRATION_ENABLED_KEY, value)?;
    Ok(enabled)
}

/// Access token lifetime in minutes.
pub fn access_token_ttl(store: &dyn ConfigStore) -> u32 {
    lookup(store, ACCESS_TOKEN_TTL_KEY)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|ttl| (MIN_ACCESS_TOKEN_TTL..=MAX_ACCESS_TOKEN_TTL).contains(ttl))
        .map(|ttl| ttl as u32)
        .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL)
}

/// Validate and store a new token lifetime. Out-of-range values never reach
/// the store.
pub fn set_access_token_ttl(store: &dyn ConfigStore, minutes: i64) -> Result<u32, SettingsError> {
    if !(MIN_ACCESS_TOKEN_TTL..=MAX_ACCESS_TOKEN_TTL).contains(&minutes) {
        return Err(SettingsError::TtlOutOfRange(minutes));
    }
    store.set(ACCESS_TOKEN_TTL_KEY, &minutes.to_string())?;
    Ok(minutes as u32)
}
