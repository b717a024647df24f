// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quiz endpoints.
//!
//! Reading is open to any authenticated user; building and deleting
//! quizzes is an admin operation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    audit_log,
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{CreateQuizRequest, QuizDetail, QuizQuery, QuizSummary},
    state::AppState,
    storage::{
        AuditEventType, Difficulty, QuestionRepository, QuizRepository, StoredQuiz,
    },
};

/// List quizzes, newest first, with question counts.
#[utoipa::path(
    get,
    path = "/v1/quizzes",
    tag = "Quizzes",
    params(QuizQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Quizzes", body = [QuizSummary]),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn list_quizzes(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Query(query): Query<QuizQuery>,
) -> Result<Json<Vec<QuizSummary>>, ApiError> {
    let repo = QuizRepository::new(&state.storage);
    let quizzes = repo
        .list(query.category.as_deref())
        .map_err(|e| ApiError::internal(format!("Failed to list quizzes: {e}")))?;

    let summaries = quizzes
        .into_iter()
        .map(|quiz| {
            let question_count = repo.question_count(&quiz.id);
            QuizSummary {
                quiz,
                question_count,
            }
        })
        .collect();

    Ok(Json(summaries))
}

/// Get a quiz with its questions.
#[utoipa::path(
    get,
    path = "/v1/quizzes/{id}",
    tag = "Quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Quiz with questions", body = QuizDetail),
        (status = 404, description = "Quiz not found"),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn get_quiz(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuizDetail>, ApiError> {
    let quiz = QuizRepository::new(&state.storage)
        .get(&id)
        .map_err(|_| ApiError::not_found("Quiz not found"))?;

    let questions = QuestionRepository::new(&state.storage)
        .list_for_quiz(&id)
        .map_err(|e| ApiError::internal(format!("Failed to load questions: {e}")))?;

    Ok(Json(QuizDetail { quiz, questions }))
}

/// Create a quiz (admin action).
#[utoipa::path(
    post,
    path = "/v1/quizzes",
    tag = "Quizzes",
    request_body = CreateQuizRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Quiz created", body = QuizSummary),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
    )
)]
pub async fn create_quiz(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateQuizRequest>,
) -> Result<(StatusCode, Json<QuizSummary>), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }

    let difficulty = match &request.difficulty {
        Some(value) => Difficulty::from_str(value)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown difficulty: {value}")))?,
        None => Difficulty::default(),
    };

    let quiz = StoredQuiz {
        id: uuid::Uuid::new_v4().to_string(),
        title: request.title,
        category: request.category,
        difficulty,
        description: request.description,
        duration_minutes: request.duration_minutes.unwrap_or(30),
        passing_score: request.passing_score.unwrap_or(60),
        created_by: admin.id.clone(),
        created_at: Utc::now(),
    };

    QuizRepository::new(&state.storage)
        .create(&quiz)
        .map_err(|e| ApiError::internal(format!("Failed to create quiz: {e}")))?;

    audit_log!(
        &state.storage,
        AuditEventType::QuizCreated,
        &admin,
        "quiz",
        &quiz.id
    );

    Ok((
        StatusCode::CREATED,
        Json(QuizSummary {
            quiz,
            question_count: 0,
        }),
    ))
}

/// Delete a quiz and its questions (admin action).
#[utoipa::path(
    delete,
    path = "/v1/quizzes/{id}",
    tag = "Quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Quiz deleted"),
        (status = 404, description = "Quiz not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
    )
)]
pub async fn delete_quiz(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    QuizRepository::new(&state.storage)
        .delete(&id)
        .map_err(|_| ApiError::not_found("Quiz not found"))?;

    audit_log!(
        &state.storage,
        AuditEventType::QuizDeleted,
        &admin,
        "quiz",
        &id
    );

    Ok(StatusCode::NO_CONTENT)
}
