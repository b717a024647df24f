// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is CurrentUser
//! }
//! ```
//!
//! The bearer token is resolved through the session store and the
//! subject's profile is fetched fresh on every request, the same
//! resolution rule the auth state manager applies.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::state::AppState;
use crate::storage::ProfileRepository;

use super::manager::CurrentUser;
use super::AuthError;

/// Extractor for authenticated users.
///
/// Validates the bearer token from the Authorization header and provides
/// the resolved user.
pub struct Auth(pub CurrentUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<CurrentUser>().cloned() {
            return Ok(Auth(user));
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        // Resolve the opaque token to a session
        let session = state
            .sessions
            .session_for_token(token)
            .await
            .ok_or(AuthError::InvalidSession)?;

        // Resolve the session subject to a profile
        let profile = ProfileRepository::new(&state.storage)
            .get(&session.subject_id)
            .map_err(|_| AuthError::ProfileNotFound)?;

        Ok(Auth(CurrentUser::from_profile(&profile)))
    }
}

/// Extractor that requires a staff role (admin or management).
pub struct StaffOnly(pub CurrentUser);

impl FromRequestParts<AppState> for StaffOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.role.is_staff() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(StaffOnly(user))
    }
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub CurrentUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if user.role != super::Role::Admin {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::{LocalSessionStore, SessionStore, SignUpMetadata};
    use crate::auth::{AccountStatus, Role};
    use crate::state::AppState;
    use crate::storage::{DataStore, StoragePaths};
    use axum::http::Request;
    use chrono::Duration;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn create_test_state() -> (AppState, TempDir, String) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let mut storage = DataStore::new(StoragePaths::new(temp.path()));
        storage.initialize().expect("Failed to initialize storage");

        let sessions = Arc::new(LocalSessionStore::new(
            storage.clone(),
            Duration::minutes(30),
        ));
        sessions
            .sign_up(
                "student@ebyte.edu",
                "password",
                SignUpMetadata {
                    first_name: "Student".to_string(),
                    last_name: "User".to_string(),
                    role: Some(Role::User),
                    status: Some(AccountStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .expect("sign up");
        let session = sessions
            .sign_in_with_password("student@ebyte.edu", "password")
            .await
            .expect("sign in");

        let state = AppState::new(storage, sessions);
        (state, temp, session.token)
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn test_user(role: Role) -> CurrentUser {
        CurrentUser {
            id: "sub-x".to_string(),
            email: "x@ebyte.edu".to_string(),
            name: "X".to_string(),
            role,
            status: AccountStatus::Active,
        }
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp, _token) = create_test_state().await;
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_header() {
        let (state, _temp, _token) = create_test_state().await;
        let mut parts = parts_with_header(Some("Basic abc123"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_unknown_token() {
        let (state, _temp, _token) = create_test_state().await;
        let mut parts = parts_with_header(Some("Bearer not-a-real-token"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidSession)));
    }

    #[tokio::test]
    async fn auth_extractor_resolves_valid_token() {
        let (state, _temp, token) = create_test_state().await;
        let header = format!("Bearer {token}");
        let mut parts = parts_with_header(Some(&header));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        let Auth(user) = result.expect("valid token resolves");
        assert_eq!(user.email, "student@ebyte.edu");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.name, "Student User");
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp, _token) = create_test_state().await;
        let mut parts = parts_with_header(None);
        parts.extensions.insert(test_user(Role::Admin));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.id, "sub-x");
    }

    #[tokio::test]
    async fn staff_only_rejects_students() {
        let (state, _temp, _token) = create_test_state().await;
        let mut parts = parts_with_header(None);
        parts.extensions.insert(test_user(Role::User));

        let result = StaffOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn staff_only_admits_management() {
        let (state, _temp, _token) = create_test_state().await;
        let mut parts = parts_with_header(None);
        parts.extensions.insert(test_user(Role::Management));

        let result = StaffOnly::from_request_parts(&mut parts, &state).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn admin_only_rejects_management() {
        let (state, _temp, _token) = create_test_state().await;
        let mut parts = parts_with_header(None);
        parts.extensions.insert(test_user(Role::Management));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_admits_admin() {
        let (state, _temp, _token) = create_test_state().await;
        let mut parts = parts_with_header(None);
        parts.extensions.insert(test_user(Role::Admin));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(result.is_ok());
    }
}
