// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Demo account seeding.
//!
//! Creates the three well-known demo accounts (admin, manager, student)
//! used by fresh installations and local development. Accounts that
//! already exist are left untouched.

use crate::auth::{AccountStatus, Role, SessionStore, SessionStoreError, SignUpMetadata};
use crate::storage::{DataStore, ProfileRepository};

struct DemoUser {
    email: &'static str,
    password: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    role: Role,
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        email: "admin@ebyte.edu",
        password: "password",
        first_name: "Admin",
        last_name: "User",
        role: Role::Admin,
    },
    DemoUser {
        email: "manager@ebyte.edu",
        password: "password",
        first_name: "Manager",
        last_name: "User",
        role: Role::Management,
    },
    DemoUser {
        email: "student@ebyte.edu",
        password: "password",
        first_name: "Student",
        last_name: "User",
        role: Role::User,
    },
];

/// Seed the demo accounts. Returns how many were newly created.
pub async fn seed_demo_users(
    storage: &DataStore,
    sessions: &dyn SessionStore,
) -> Result<usize, SessionStoreError> {
    let profiles = ProfileRepository::new(storage);
    let mut created = 0;

    for user in DEMO_USERS {
        if profiles.find_by_email(user.email).is_ok() {
            tracing::debug!(email = user.email, "demo user already exists, skipping");
            continue;
        }

        sessions
            .sign_up(
                user.email,
                user.password,
                SignUpMetadata {
                    first_name: user.first_name.to_string(),
                    last_name: user.last_name.to_string(),
                    role: Some(user.role),
                    status: Some(AccountStatus::Active),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(email = user.email, role = %user.role, "seeded demo user");
        created += 1;
    }

    Ok(created)
}
