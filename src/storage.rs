//! Key/value persistence for task lists and the active username.
//!
//! The store layer only ever needs two primitives, `load` and `save`, so every
//! back end implements just those. `FileStore` keeps one file per key inside a
//! data directory; `MemoryStore` is an in-process map used by tests.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Minimal durable key/value interface.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if nothing was ever written.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

/// In-memory store. Writes can be made to fail to simulate a full disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Seed a raw value without going through `save`.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }
        if self.fail_writes {
            return Err(StorageError::WriteRejected);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-per-key store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store in `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(FileStore { dir: dir.to_path_buf() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }
        Ok(self.dir.join(format!("{}.json", encode_key(key))))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        let mut buf = String::new();
        match File::open(&path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => Ok(Some(buf)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let io_err = |source: std::io::Error| StorageError::Io { path: tmp.clone(), source };
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(value.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path: path.clone(), source })?;
        tracing::debug!(key, path = %path.display(), bytes = value.len(), "value written");
        Ok(())
    }
}

/// Encode a storage key as a file stem.
/// Keeps ASCII alphanumerics and `-_.`; every other byte becomes `%XX`.
pub fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else if b == b'.' && !out.is_empty() {
            out.push('.');
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
