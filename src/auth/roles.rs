// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles and account statuses for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Areas
///
/// - `Admin` - account validation, quiz building, platform analytics
/// - `Management` - student enrollment and oversight of own students
/// - `User` - courses, exercises, quizzes and own results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Manager (enrolls and oversees students)
    Management,
    /// Normal student user
    User,
}

impl Role {
    /// Parse role from string (case-insensitive).
    /// Used when reading roles from signup metadata and query filters.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "management" => Some(Role::Management),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Staff roles may list and enroll users.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Management)
    }
}

impl Default for Role {
    /// Default role is User (least privilege for new accounts).
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Management => write!(f, "management"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Account lifecycle status.
///
/// New accounts start as `Pending` until an admin validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Validated account
    Active,
    /// Awaiting admin validation
    Pending,
    /// Validation was refused
    Rejected,
}

impl AccountStatus {
    /// Parse status from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<AccountStatus> {
        match s.to_lowercase().as_str() {
            "active" => Some(AccountStatus::Active),
            "pending" => Some(AccountStatus::Pending),
            "rejected" => Some(AccountStatus::Rejected),
            _ => None,
        }
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        AccountStatus::Pending
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Pending => write!(f, "pending"),
            AccountStatus::Rejected => write!(f, "rejected"),
        }
    }
}
