// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management endpoints.
//!
//! Listing and creation are staff operations; profile edits (validation,
//! role changes) are admin-only. Whether a manager sees all users or only
//! the students they added is a deployment policy (`MANAGER_SCOPE`).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    audit_log,
    auth::{AccountStatus, AdminOnly, Role, SessionStoreError, SignUpMetadata, StaffOnly},
    config::ManagerScope,
    error::ApiError,
    models::{
        CreateUserRequest, CreateUserResponse, ManagerSummary, UpdateUserRequest, UserQuery,
        UserResponse,
    },
    state::AppState,
    storage::{AuditEventType, ProfileFilter, ProfileRepository, StoredProfile},
};

fn manager_summary(
    profiles: &ProfileRepository<'_>,
    profile: &StoredProfile,
) -> Option<ManagerSummary> {
    let added_by = profile.added_by.as_deref()?;
    let manager = profiles.get(added_by).ok()?;
    Some(ManagerSummary {
        first_name: manager.first_name,
        last_name: manager.last_name,
        institute_name: manager.institute_name,
    })
}

/// List users, newest first.
///
/// Optional `status` and `role` filters; `role=all` is a no-op filter.
/// Managers are scoped to their own students under the default policy.
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    params(UserQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (staff required)"),
    )
)]
pub async fn list_users(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let mut filter = ProfileFilter::default();

    if let Some(status) = &query.status {
        filter.status = Some(
            AccountStatus::from_str(status)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown status: {status}")))?,
        );
    }

    if let Some(role) = &query.role {
        if role != "all" {
            filter.role = Some(
                Role::from_str(role)
                    .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {role}")))?,
            );
        }
    }

    // Management users only see their own students under the default policy.
    if user.role == Role::Management && state.manager_scope == ManagerScope::OwnStudents {
        filter.added_by = Some(user.id.clone());
    }

    let profiles = ProfileRepository::new(&state.storage);
    let listed = profiles
        .list(&filter)
        .map_err(|e| ApiError::internal(format!("Failed to list users: {e}")))?;

    let users = listed
        .into_iter()
        .map(|profile| {
            let manager = manager_summary(&profiles, &profile);
            UserResponse::from_profile(profile, manager)
        })
        .collect();

    Ok(Json(users))
}

/// Create a user account (staff action).
///
/// The account starts pending, is marked as added by the requester, and
/// gets a generated password when none is supplied.
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (staff required)"),
    )
)]
pub async fn create_user(
    StaffOnly(requester): StaffOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    if request.email.trim().is_empty() || request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Email and name are required"));
    }

    let role = match &request.role {
        Some(role) => Role::from_str(role)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {role}")))?,
        None => Role::User,
    };

    let mut parts = request.name.trim().split_whitespace();
    let first_name = parts.next().unwrap_or_default().to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");

    // Institute name only applies to management accounts.
    let institute_name = if role == Role::Management {
        request.institute_name.clone()
    } else {
        None
    };

    let password = request
        .password
        .clone()
        .unwrap_or_else(crate::auth::session::generate_password);

    let user_id = state
        .sessions
        .sign_up(
            &request.email,
            &password,
            SignUpMetadata {
                first_name,
                last_name,
                role: Some(role),
                status: Some(AccountStatus::Pending),
                institute_name,
                added_by: Some(requester.id.clone()),
            },
        )
        .await
        .map_err(|e| match e {
            SessionStoreError::EmailTaken(email) => {
                ApiError::conflict(format!("An account with email {email} already exists"))
            }
            e => ApiError::internal(format!("Failed to create user: {e}")),
        })?;

    audit_log!(
        &state.storage,
        AuditEventType::ProfileCreated,
        &requester,
        "profile",
        &user_id
    );

    Ok((StatusCode::CREATED, Json(CreateUserResponse { user_id })))
}

/// Update a user's profile (admin action).
///
/// Only the provided fields change; used for validation (status flips),
/// role changes and name fixes.
#[utoipa::path(
    patch,
    path = "/v1/users/{id}",
    tag = "Users",
    request_body = UpdateUserRequest,
    params(("id" = String, Path, description = "Subject id of the user")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
    )
)]
pub async fn update_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let profiles = ProfileRepository::new(&state.storage);
    let mut profile = profiles
        .get(&id)
        .map_err(|_| ApiError::not_found("User not found"))?;

    if let Some(status) = &request.status {
        profile.status = AccountStatus::from_str(status)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown status: {status}")))?;
    }
    if let Some(role) = &request.role {
        profile.role = Role::from_str(role)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {role}")))?;
    }
    if let Some(first_name) = &request.first_name {
        profile.first_name = first_name.clone();
    }
    if let Some(last_name) = &request.last_name {
        profile.last_name = last_name.clone();
    }

    profiles
        .update(&profile)
        .map_err(|e| ApiError::internal(format!("Failed to update user: {e}")))?;

    audit_log!(
        &state.storage,
        AuditEventType::ProfileUpdated,
        &admin,
        "profile",
        &id
    );

    let manager = manager_summary(&profiles, &profile);
    Ok(Json(UserResponse::from_profile(profile, manager)))
}
