// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential account repository.
//!
//! Accounts hold the password digest backing the local session store. They
//! are deliberately separate from profiles: the rest of the service only
//! ever sees subject ids, never credential material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{DataStore, StorageError, StorageResult};

/// Credential record for one subject id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredAccount {
    /// Subject id (shared with the profile).
    pub subject_id: String,
    /// Account email address.
    pub email: String,
    /// HMAC-SHA-256 digest of the password, base64-encoded.
    pub password_digest: String,
    /// Per-account random salt used as the HMAC key, base64-encoded.
    pub salt: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Repository for credential accounts.
pub struct AccountRepository<'a> {
    storage: &'a DataStore,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository.
    pub fn new(storage: &'a DataStore) -> Self {
        Self { storage }
    }

    /// Check if an account exists.
    pub fn exists(&self, subject_id: &str) -> bool {
        self.storage.exists(self.storage.paths().account(subject_id))
    }

    /// Get an account by subject id.
    pub fn get(&self, subject_id: &str) -> StorageResult<StoredAccount> {
        let path = self.storage.paths().account(subject_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Account {subject_id}")));
        }
        self.storage.read_json(path)
    }

    /// Get an account by email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<StoredAccount> {
        let ids = self
            .storage
            .list_files(self.storage.paths().accounts_dir(), "json")?;

        for id in ids {
            if let Ok(account) = self.get(&id) {
                if account.email.eq_ignore_ascii_case(email) {
                    return Ok(account);
                }
            }
        }

        Err(StorageError::NotFound(format!("Account with email {email}")))
    }

    /// Create a new account.
    pub fn create(&self, account: &StoredAccount) -> StorageResult<()> {
        if self.exists(&account.subject_id) {
            return Err(StorageError::AlreadyExists(format!(
                "Account {}",
                account.subject_id
            )));
        }

        if self.find_by_email(&account.email).is_ok() {
            return Err(StorageError::AlreadyExists(format!(
                "Account with email {}",
                account.email
            )));
        }

        self.storage
            .write_json(self.storage.paths().account(&account.subject_id), account)
    }
}
