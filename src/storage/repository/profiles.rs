// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile repository.
//!
//! A profile is the durable identity record keyed by the session subject id.
//! Each profile is stored as a separate JSON file under `profiles/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AccountStatus, Role};

use super::super::{DataStore, StorageError, StorageResult};

/// Identity record stored per subject id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredProfile {
    /// Subject id issued by the session store.
    pub id: String,
    /// Account email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Authorization role.
    pub role: Role,
    /// Validation status.
    pub status: AccountStatus,
    /// Institute name (management accounts only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute_name: Option<String>,
    /// Subject id of the staff member who created this account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

impl StoredProfile {
    /// Display name: first and last name joined, trimmed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Filter for profile listings.
#[derive(Debug, Default, Clone)]
pub struct ProfileFilter {
    pub status: Option<AccountStatus>,
    pub role: Option<Role>,
    pub added_by: Option<String>,
}

/// Repository for profile records.
pub struct ProfileRepository<'a> {
    storage: &'a DataStore,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new ProfileRepository.
    pub fn new(storage: &'a DataStore) -> Self {
        Self { storage }
    }

    /// Check if a profile exists.
    pub fn exists(&self, subject_id: &str) -> bool {
        self.storage.exists(self.storage.paths().profile(subject_id))
    }

    /// Get a profile by subject id.
    pub fn get(&self, subject_id: &str) -> StorageResult<StoredProfile> {
        let path = self.storage.paths().profile(subject_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Profile {subject_id}")));
        }
        self.storage.read_json(path)
    }

    /// Get a profile by email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<StoredProfile> {
        let ids = self
            .storage
            .list_files(self.storage.paths().profiles_dir(), "json")?;

        for id in ids {
            if let Ok(profile) = self.get(&id) {
                if profile.email.eq_ignore_ascii_case(email) {
                    return Ok(profile);
                }
            }
        }

        Err(StorageError::NotFound(format!("Profile with email {email}")))
    }

    /// Create a new profile.
    pub fn create(&self, profile: &StoredProfile) -> StorageResult<()> {
        if self.exists(&profile.id) {
            return Err(StorageError::AlreadyExists(format!("Profile {}", profile.id)));
        }

        if self.find_by_email(&profile.email).is_ok() {
            return Err(StorageError::AlreadyExists(format!(
                "Profile with email {}",
                profile.email
            )));
        }

        self.storage
            .write_json(self.storage.paths().profile(&profile.id), profile)
    }

    /// Update an existing profile.
    pub fn update(&self, profile: &StoredProfile) -> StorageResult<()> {
        if !self.exists(&profile.id) {
            return Err(StorageError::NotFound(format!("Profile {}", profile.id)));
        }

        self.storage
            .write_json(self.storage.paths().profile(&profile.id), profile)
    }

    /// List profiles matching a filter, newest first.
    pub fn list(&self, filter: &ProfileFilter) -> StorageResult<Vec<StoredProfile>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().profiles_dir(), "json")?;

        let mut profiles = Vec::new();
        for id in ids {
            if let Ok(profile) = self.get(&id) {
                if let Some(status) = filter.status {
                    if profile.status != status {
                        continue;
                    }
                }
                if let Some(role) = filter.role {
                    if profile.role != role {
                        continue;
                    }
                }
                if let Some(added_by) = &filter.added_by {
                    if profile.added_by.as_deref() != Some(added_by.as_str()) {
                        continue;
                    }
                }
                profiles.push(profile);
            }
        }

        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    /// List all profiles, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredProfile>> {
        self.list(&ProfileFilter::default())
    }
}
