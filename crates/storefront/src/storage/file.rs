//! File-backed storage backend.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{StorageBackend, StorageError};

/// Durable storage keeping one JSON document per key under a data
/// directory (`<dir>/<key>.json`).
///
/// Writes go to a uniquely named temp file first and are renamed into
/// place, so a crash mid-write leaves the previous snapshot intact and
/// concurrent writers cannot interleave partial content. The unique temp
/// name matters: two processes writing the same key must not clobber each
/// other's staging file.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory this store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StorageError::Io(error)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        let staging = self
            .dir
            .join(format!("{key}.json.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&staging, value)?;
        if let Err(error) = fs::rename(&staging, &path) {
            // Leave no stray staging file behind; the rename error is the
            // one worth reporting.
            let _ = fs::remove_file(&staging);
            return Err(StorageError::Io(error));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StorageError::Io(error)),
        }
    }
}

/// Keys become file names, so they must be non-empty and path-safe.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let safe = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if safe {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}
