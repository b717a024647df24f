// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for user-scoped records.

use crate::auth::CurrentUser;

use super::{StorageError, StorageResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's subject ID.
    fn owner_id(&self) -> &str;
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the user owns this resource.
    ///
    /// # Errors
    /// Returns `StorageError::PermissionDenied` if the user doesn't own the resource.
    fn verify_ownership(&self, user: &CurrentUser) -> StorageResult<()>;

    /// Verify ownership, allowing staff (admin/management) through.
    fn verify_ownership_or_staff(&self, user: &CurrentUser) -> StorageResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &CurrentUser) -> StorageResult<()> {
        if self.owner_id() == user.id {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied {
                user_id: user.id.clone(),
                resource: "resource".to_string(),
            })
        }
    }

    fn verify_ownership_or_staff(&self, user: &CurrentUser) -> StorageResult<()> {
        if user.role.is_staff() {
            return Ok(());
        }
        self.verify_ownership(user)
    }
}
