// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session-synchronized role-based access control.
//!
//! ## Auth Flow
//!
//! 1. A client signs in with email + password; the session store issues an
//!    opaque bearer token
//! 2. The auth state manager resolves the session's subject id to a
//!    profile and publishes the derived `CurrentUser`
//! 3. Route guards consult the published state plus the role/route policy
//!    to render or redirect
//! 4. API requests carry `Authorization: Bearer <token>`; extractors
//!    resolve the token and profile per request
//!
//! ## Ordering
//!
//! Session-change events are handled in delivery order and every profile
//! resolution is sequence-tagged; a stale resolution never overwrites a
//! newer one (see `manager`).

pub mod error;
pub mod extractor;
pub mod guard;
pub mod manager;
pub mod policy;
pub mod roles;
pub mod session;

pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, StaffOnly};
pub use guard::{GuardDecision, Navigator, RouteGuard};
pub use manager::{AuthSnapshot, AuthStateManager, CurrentUser, ProfileStore};
pub use policy::can_access;
pub use roles::{AccountStatus, Role};
pub use session::{
    LocalSessionStore, Session, SessionChange, SessionEvent, SessionStore, SessionStoreError,
    SignUpMetadata,
};
