// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoints.
//!
//! Login resolves the profile before responding, so the caller always gets
//! the full user back with the token. Logout revokes only the presented
//! token and is idempotent.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};

use crate::{
    audit_log,
    auth::{manager::CurrentUser, Auth, SessionStoreError, SignUpMetadata},
    error::ApiError,
    models::{LoginRequest, LoginResponse, RequestAccessRequest},
    state::AppState,
    storage::{AuditEvent, AuditEventType, AuditRepository, ProfileRepository},
};

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = match state
        .sessions
        .sign_in_with_password(&request.email, &request.password)
        .await
    {
        Ok(session) => session,
        Err(SessionStoreError::InvalidCredentials) => {
            let audit = AuditRepository::new(&state.storage);
            let _ = audit.log(
                &AuditEvent::new(AuditEventType::AuthFailure)
                    .with_details(serde_json::json!({"email": request.email}))
                    .failed("invalid credentials"),
            );
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
        Err(e) => return Err(ApiError::internal(format!("Sign-in failed: {e}"))),
    };

    // Resolve the profile now rather than leaving the caller to race the
    // session-change event.
    let profile = ProfileRepository::new(&state.storage)
        .get(&session.subject_id)
        .map_err(|_| ApiError::unauthorized("No profile exists for this account"))?;

    let user = CurrentUser::from_profile(&profile);
    audit_log!(&state.storage, AuditEventType::AuthSuccess, &user);

    Ok(Json(LoginResponse {
        access_token: session.token,
        user,
    }))
}

/// Sign out: revoke the presented bearer token.
///
/// Safe to call with a missing or already-revoked token.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Signed out"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    if let Some(token) = token {
        state
            .sessions
            .revoke(token)
            .await
            .map_err(|e| ApiError::internal(format!("Sign-out failed: {e}")))?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Request access: register a pending account.
///
/// The account gets a random throwaway password; it is not expected to be
/// used until an admin validates it and credentials are issued properly.
#[utoipa::path(
    post,
    path = "/v1/auth/request-access",
    tag = "Auth",
    request_body = RequestAccessRequest,
    responses(
        (status = 201, description = "Access requested"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn request_access(
    State(state): State<AppState>,
    Json(request): Json<RequestAccessRequest>,
) -> Result<StatusCode, ApiError> {
    if request.email.trim().is_empty() || request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Email and name are required"));
    }

    let mut parts = request.name.trim().split_whitespace();
    let first_name = parts.next().unwrap_or_default().to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");

    let subject_id = state
        .sessions
        .sign_up(
            &request.email,
            &crate::auth::session::generate_password(),
            SignUpMetadata {
                first_name,
                last_name,
                ..Default::default()
            },
        )
        .await
        .map_err(|e| match e {
            SessionStoreError::EmailTaken(email) => {
                ApiError::conflict(format!("An account with email {email} already exists"))
            }
            e => ApiError::internal(format!("Registration failed: {e}")),
        })?;

    let audit = AuditRepository::new(&state.storage);
    let _ = audit.log(
        &AuditEvent::new(AuditEventType::AccessRequested).with_resource("profile", &subject_id),
    );

    Ok(StatusCode::CREATED)
}

/// Get the current authenticated user.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = CurrentUser),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn me(Auth(user): Auth) -> Json<CurrentUser> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccountStatus, LocalSessionStore, Role, SessionStore};
    use crate::storage::{DataStore, StoragePaths};
    use chrono::Duration;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn test_state() -> (AppState, TempDir) {
        let temp = TempDir::new().unwrap();
        let mut storage = DataStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let sessions = Arc::new(LocalSessionStore::new(
            storage.clone(),
            Duration::minutes(30),
        ));
        sessions
            .sign_up(
                "admin@ebyte.edu",
                "password",
                SignUpMetadata {
                    first_name: "Admin".to_string(),
                    last_name: "User".to_string(),
                    role: Some(Role::Admin),
                    status: Some(AccountStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (AppState::new(storage, sessions), temp)
    }

    #[tokio::test]
    async fn login_returns_token_and_resolved_user() {
        let (state, _temp) = test_state().await;

        let Json(response) = login(
            State(state),
            Json(LoginRequest {
                email: "admin@ebyte.edu".to_string(),
                password: "password".to_string(),
            }),
        )
        .await
        .expect("login succeeds");

        assert!(!response.access_token.is_empty());
        assert_eq!(response.user.role, Role::Admin);
        assert_eq!(response.user.name, "Admin User");
    }

    #[tokio::test]
    async fn login_with_bad_password_is_401() {
        let (state, _temp) = test_state().await;

        let result = login(
            State(state),
            Json(LoginRequest {
                email: "admin@ebyte.edu".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await;

        match result {
            Err(err) => assert_eq!(err.status, StatusCode::UNAUTHORIZED),
            Ok(_) => panic!("expected error for bad password"),
        }
    }

    #[tokio::test]
    async fn logout_revokes_token_and_is_idempotent() {
        let (state, _temp) = test_state().await;

        let session = state
            .sessions
            .sign_in_with_password("admin@ebyte.edu", "password")
            .await
            .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", session.token).parse().unwrap(),
        );

        let status = logout(State(state.clone()), headers.clone()).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.sessions.session_for_token(&session.token).await.is_none());

        // Second call with the same dead token still succeeds.
        let status = logout(State(state.clone()), headers).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        // So does a call without any token at all.
        let status = logout(State(state), HeaderMap::new()).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn request_access_creates_pending_account() {
        let (state, _temp) = test_state().await;

        let status = request_access(
            State(state.clone()),
            Json(RequestAccessRequest {
                email: "newcomer@ebyte.edu".to_string(),
                name: "New Comer".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let profile = ProfileRepository::new(&state.storage)
            .find_by_email("newcomer@ebyte.edu")
            .unwrap();
        assert_eq!(profile.status, AccountStatus::Pending);
        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.first_name, "New");
        assert_eq!(profile.last_name, "Comer");
    }

    #[tokio::test]
    async fn request_access_conflicts_on_taken_email() {
        let (state, _temp) = test_state().await;

        let result = request_access(
            State(state),
            Json(RequestAccessRequest {
                email: "admin@ebyte.edu".to_string(),
                name: "Pretender".to_string(),
            }),
        )
        .await;

        match result {
            Err(err) => assert_eq!(err.status, StatusCode::CONFLICT),
            Ok(_) => panic!("expected conflict for taken email"),
        }
    }

    #[tokio::test]
    async fn request_access_rejects_blank_input() {
        let (state, _temp) = test_state().await;

        let result = request_access(
            State(state),
            Json(RequestAccessRequest {
                email: "  ".to_string(),
                name: "Someone".to_string(),
            }),
        )
        .await;

        match result {
            Err(err) => assert_eq!(err.status, StatusCode::BAD_REQUEST),
            Ok(_) => panic!("expected bad request"),
        }
    }
}
