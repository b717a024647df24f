// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quiz result repository.
//!
//! A result records one user's score on one quiz attempt. Results are
//! user-owned; students only see their own, staff see all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DataStore, OwnedResource, StorageError, StorageResult};

/// A recorded quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredResult {
    /// Unique result identifier (UUID).
    pub id: String,
    /// The quiz that was taken.
    pub quiz_id: String,
    /// Subject id of the user who took it.
    pub user_id: String,
    /// Score in percent (0-100).
    pub score: u32,
    /// When the attempt was recorded.
    pub created_at: DateTime<Utc>,
}

impl OwnedResource for StoredResult {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Repository for quiz results.
pub struct ResultRepository<'a> {
    storage: &'a DataStore,
}

impl<'a> ResultRepository<'a> {
    /// Create a new ResultRepository.
    pub fn new(storage: &'a DataStore) -> Self {
        Self { storage }
    }

    /// Check if a result exists.
    pub fn exists(&self, result_id: &str) -> bool {
        self.storage.exists(self.storage.paths().result(result_id))
    }

    /// Get a result by id.
    pub fn get(&self, result_id: &str) -> StorageResult<StoredResult> {
        let path = self.storage.paths().result(result_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Result {result_id}")));
        }
        self.storage.read_json(path)
    }

    /// Record a new result.
    pub fn create(&self, result: &StoredResult) -> StorageResult<()> {
        if self.exists(&result.id) {
            return Err(StorageError::AlreadyExists(format!("Result {}", result.id)));
        }

        self.storage
            .write_json(self.storage.paths().result(&result.id), result)
    }

    /// List all results, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredResult>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().results_dir(), "json")?;

        let mut results = Vec::new();
        for id in ids {
            if let Ok(result) = self.get(&id) {
                results.push(result);
            }
        }

        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }

    /// List one user's results, newest first.
    pub fn list_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredResult>> {
        let mut results = self.list_all()?;
        results.retain(|r| r.user_id == user_id);
        Ok(results)
    }
}
