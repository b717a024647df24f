// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::SessionStore;
use crate::config::ManagerScope;
use crate::storage::DataStore;

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// JSON file store backing all repositories.
    pub storage: DataStore,
    /// Session store handle (token issue/resolve/revoke).
    pub sessions: Arc<dyn SessionStore>,
    /// Manager user-visibility policy.
    pub manager_scope: ManagerScope,
}

impl AppState {
    pub fn new(storage: DataStore, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            storage,
            sessions,
            manager_scope: ManagerScope::default(),
        }
    }

    /// Override the manager visibility policy.
    pub fn with_manager_scope(mut self, scope: ManagerScope) -> Self {
        self.manager_scope = scope;
        self
    }
}
