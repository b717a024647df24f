// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON file storage under the data directory.
//!
//! One entity per file. A write lands in a sibling temp file first and is
//! moved into place with a rename, so a reader never observes a torn
//! record and a crash mid-write leaves the previous version intact.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::StoragePaths;

/// Error type for storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O failure underneath a storage call
    Io(io::Error),
    /// A record could not be serialized or parsed
    Json(serde_json::Error),
    /// Entity not found
    NotFound(String),
    /// Entity already exists
    AlreadyExists(String),
    /// `initialize` has not been called on this store
    NotInitialized,
    /// Ownership check failed
    PermissionDenied { user_id: String, resource: String },
    /// Catch-all for malformed stored data
    SerializationError(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage I/O failed: {e}"),
            StorageError::Json(e) => write!(f, "malformed JSON record: {e}"),
            StorageError::NotFound(entity) => write!(f, "{entity} does not exist"),
            StorageError::AlreadyExists(entity) => write!(f, "{entity} already exists"),
            StorageError::NotInitialized => write!(f, "data directory has not been initialized"),
            StorageError::PermissionDenied { user_id, resource } => {
                write!(f, "user {user_id} may not access {resource}")
            }
            StorageError::SerializationError(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        // A missing file is a domain condition, not an I/O fault.
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// File-backed data store for all persistent entities.
#[derive(Debug, Clone)]
pub struct DataStore {
    paths: StoragePaths,
    initialized: bool,
}

impl DataStore {
    /// Create a store over the given layout. Call [`initialize`] before
    /// any read or write.
    ///
    /// [`initialize`]: DataStore::initialize
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// The storage layout.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create every entity directory under the data root. Idempotent.
    pub fn initialize(&mut self) -> StorageResult<()> {
        for dir in [
            self.paths.profiles_dir(),
            self.paths.accounts_dir(),
            self.paths.quizzes_dir(),
            self.paths.results_dir(),
            self.paths.audit_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    fn ensure_ready(&self) -> StorageResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }

    /// Verify the data root is writable with a probe write-read-remove.
    pub fn health_check(&self) -> StorageResult<()> {
        self.ensure_ready()?;

        let probe = self.paths.root().join(".health_check");
        fs::write(&probe, b"probe")?;
        let echoed = fs::read(&probe)?;
        fs::remove_file(&probe)?;

        if echoed != b"probe" {
            return Err(StorageError::SerializationError(
                "health probe read back different bytes".to_string(),
            ));
        }
        Ok(())
    }

    /// Deserialize one JSON record.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        self.ensure_ready()?;
        let bytes = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Serialize one JSON record, atomically (temp file + rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        self.ensure_ready()?;
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staged = path.with_extension("json.tmp");
        fs::write(&staged, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&staged, path)?;
        Ok(())
    }

    /// Append one record to a JSONL file, creating it as needed.
    pub fn append_line<T: Serialize>(
        &self,
        path: impl AsRef<Path>,
        value: &T,
    ) -> StorageResult<()> {
        self.ensure_ready()?;
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(serde_json::to_string(value)?.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    /// Read a whole file as UTF-8 text.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> StorageResult<String> {
        self.ensure_ready()?;
        Ok(fs::read_to_string(path.as_ref())?)
    }

    /// Whether a record file exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// Remove a record file.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        self.ensure_ready()?;
        fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// Remove a directory tree (a quiz with its questions).
    pub fn delete_dir(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        self.ensure_ready()?;
        fs::remove_dir_all(path.as_ref())?;
        Ok(())
    }

    /// Stems of the files in `dir` carrying `extension`. A directory that
    /// does not exist yet lists as empty.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        self.ensure_ready()?;
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let ids = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == extension))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        Ok(ids)
    }

    /// Names of the subdirectories of `dir`.
    pub fn list_dirs(&self, dir: impl AsRef<Path>) -> StorageResult<Vec<String>> {
        self.ensure_ready()?;
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let names = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        Ok(names)
    }
}
