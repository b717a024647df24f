// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quiz result endpoints.
//!
//! Results are owned by the submitting user. Students see their own,
//! staff see everyone's.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    audit_log,
    auth::Auth,
    error::ApiError,
    models::RecordResultRequest,
    state::AppState,
    storage::{
        AuditEventType, OwnershipEnforcer, QuizRepository, ResultRepository, StorageError,
        StoredResult,
    },
};

/// Record a quiz attempt for the authenticated user.
#[utoipa::path(
    post,
    path = "/v1/results",
    tag = "Results",
    request_body = RecordResultRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Result recorded", body = StoredResult),
        (status = 400, description = "Invalid score"),
        (status = 404, description = "Quiz not found"),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn record_result(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<RecordResultRequest>,
) -> Result<(StatusCode, Json<StoredResult>), ApiError> {
    if request.score > 100 {
        return Err(ApiError::bad_request("Score must be between 0 and 100"));
    }

    if !QuizRepository::new(&state.storage).exists(&request.quiz_id) {
        return Err(ApiError::not_found("Quiz not found"));
    }

    let result = StoredResult {
        id: uuid::Uuid::new_v4().to_string(),
        quiz_id: request.quiz_id,
        user_id: user.id.clone(),
        score: request.score,
        created_at: Utc::now(),
    };

    ResultRepository::new(&state.storage)
        .create(&result)
        .map_err(|e| ApiError::internal(format!("Failed to record result: {e}")))?;

    audit_log!(
        &state.storage,
        AuditEventType::ResultRecorded,
        &user,
        "result",
        &result.id
    );

    Ok((StatusCode::CREATED, Json(result)))
}

/// List results: own attempts for students, all attempts for staff.
#[utoipa::path(
    get,
    path = "/v1/results",
    tag = "Results",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Results", body = [StoredResult]),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn list_results(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredResult>>, ApiError> {
    let repo = ResultRepository::new(&state.storage);

    let results = if user.role.is_staff() {
        repo.list_all()
    } else {
        repo.list_by_user(&user.id)
    }
    .map_err(|e| ApiError::internal(format!("Failed to list results: {e}")))?;

    Ok(Json(results))
}

/// Get one result; only the owner or staff may read it.
#[utoipa::path(
    get,
    path = "/v1/results/{id}",
    tag = "Results",
    params(("id" = String, Path, description = "Result id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Result", body = StoredResult),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Result not found"),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn get_result(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredResult>, ApiError> {
    let result = ResultRepository::new(&state.storage)
        .get(&id)
        .map_err(|_| ApiError::not_found("Result not found"))?;

    result
        .verify_ownership_or_staff(&user)
        .map_err(|e| match e {
            StorageError::PermissionDenied { .. } => ApiError::forbidden("Not your result"),
            e => ApiError::internal(format!("Ownership check failed: {e}")),
        })?;

    Ok(Json(result))
}
