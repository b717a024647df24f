// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for JSON storage | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SESSION_TTL_MINUTES` | Lifetime of issued sessions | `720` |
//! | `MANAGER_SCOPE` | User visibility for managers (`own-students` or `all`) | `own-students` |
//! | `SEED_DEMO_USERS` | Seed the three demo accounts when set | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the session lifetime in minutes.
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_MINUTES";

/// Environment variable name for the manager visibility policy.
pub const MANAGER_SCOPE_ENV: &str = "MANAGER_SCOPE";

/// Environment variable that triggers demo-account seeding when set.
pub const SEED_DEMO_USERS_ENV: &str = "SEED_DEMO_USERS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default session lifetime in minutes (12 hours).
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 720;

/// Which users a management account may see.
///
/// The product behavior varied here, so it is a policy parameter rather
/// than a hard rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerScope {
    /// Managers see only the students they added.
    #[default]
    OwnStudents,
    /// Managers see every user.
    All,
}

impl ManagerScope {
    /// Parse from the `MANAGER_SCOPE` value; unknown values fall back to
    /// the default.
    pub fn from_str(s: &str) -> ManagerScope {
        match s.to_lowercase().as_str() {
            "all" => ManagerScope::All,
            _ => ManagerScope::OwnStudents,
        }
    }

    /// Read the policy from the environment.
    pub fn from_env() -> ManagerScope {
        std::env::var(MANAGER_SCOPE_ENV)
            .map(|v| ManagerScope::from_str(&v))
            .unwrap_or_default()
    }
}
