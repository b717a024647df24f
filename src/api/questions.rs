// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quiz question endpoints.
//!
//! New questions are appended after the quiz's current maximum order.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    audit_log,
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{CreateQuestionRequest, UpdateQuestionRequest},
    state::AppState,
    storage::{AuditEventType, QuestionRepository, QuizRepository, StoredQuestion},
};

/// List a quiz's questions in order.
#[utoipa::path(
    get,
    path = "/v1/quizzes/{id}/questions",
    tag = "Questions",
    params(("id" = String, Path, description = "Quiz id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Questions in order", body = [StoredQuestion]),
        (status = 404, description = "Quiz not found"),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn list_questions(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<Vec<StoredQuestion>>, ApiError> {
    if !QuizRepository::new(&state.storage).exists(&quiz_id) {
        return Err(ApiError::not_found("Quiz not found"));
    }

    let questions = QuestionRepository::new(&state.storage)
        .list_for_quiz(&quiz_id)
        .map_err(|e| ApiError::internal(format!("Failed to list questions: {e}")))?;

    Ok(Json(questions))
}

/// Add a question to a quiz (admin action).
#[utoipa::path(
    post,
    path = "/v1/quizzes/{id}/questions",
    tag = "Questions",
    request_body = CreateQuestionRequest,
    params(("id" = String, Path, description = "Quiz id")),
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Question created", body = StoredQuestion),
        (status = 404, description = "Quiz not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
    )
)]
pub async fn create_question(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(request): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<StoredQuestion>), ApiError> {
    if !QuizRepository::new(&state.storage).exists(&quiz_id) {
        return Err(ApiError::not_found("Quiz not found"));
    }

    let repo = QuestionRepository::new(&state.storage);
    let order_num = repo
        .next_order_num(&quiz_id)
        .map_err(|e| ApiError::internal(format!("Failed to order question: {e}")))?;

    let question = StoredQuestion {
        id: uuid::Uuid::new_v4().to_string(),
        quiz_id: quiz_id.clone(),
        question_text: request.question_text,
        question_type: request
            .question_type
            .unwrap_or_else(|| "multiple_choice".to_string()),
        options: request.options,
        correct_answer: request.correct_answer,
        explanation: request.explanation,
        order_num,
    };

    repo.create(&question)
        .map_err(|e| ApiError::internal(format!("Failed to create question: {e}")))?;

    audit_log!(
        &state.storage,
        AuditEventType::QuestionCreated,
        &admin,
        "question",
        &question.id
    );

    Ok((StatusCode::CREATED, Json(question)))
}

/// Update a question (admin action). Only the provided fields change.
#[utoipa::path(
    put,
    path = "/v1/quizzes/{id}/questions/{question_id}",
    tag = "Questions",
    request_body = UpdateQuestionRequest,
    params(
        ("id" = String, Path, description = "Quiz id"),
        ("question_id" = String, Path, description = "Question id"),
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated question", body = StoredQuestion),
        (status = 404, description = "Question not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
    )
)]
pub async fn update_question(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
    Json(request): Json<UpdateQuestionRequest>,
) -> Result<Json<StoredQuestion>, ApiError> {
    let repo = QuestionRepository::new(&state.storage);
    let mut question = repo
        .get(&quiz_id, &question_id)
        .map_err(|_| ApiError::not_found("Question not found"))?;

    if let Some(question_text) = request.question_text {
        question.question_text = question_text;
    }
    if let Some(question_type) = request.question_type {
        question.question_type = question_type;
    }
    if let Some(options) = request.options {
        question.options = Some(options);
    }
    if let Some(correct_answer) = request.correct_answer {
        question.correct_answer = correct_answer;
    }
    if let Some(explanation) = request.explanation {
        question.explanation = Some(explanation);
    }

    repo.update(&question)
        .map_err(|e| ApiError::internal(format!("Failed to update question: {e}")))?;

    audit_log!(
        &state.storage,
        AuditEventType::QuestionUpdated,
        &admin,
        "question",
        &question_id
    );

    Ok(Json(question))
}

/// Delete a question (admin action).
#[utoipa::path(
    delete,
    path = "/v1/quizzes/{id}/questions/{question_id}",
    tag = "Questions",
    params(
        ("id" = String, Path, description = "Quiz id"),
        ("question_id" = String, Path, description = "Question id"),
    ),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Question not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
    )
)]
pub async fn delete_question(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path((quiz_id, question_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    QuestionRepository::new(&state.storage)
        .delete(&quiz_id, &question_id)
        .map_err(|_| ApiError::not_found("Question not found"))?;

    audit_log!(
        &state.storage,
        AuditEventType::QuestionDeleted,
        &admin,
        "question",
        &question_id
    );

    Ok(StatusCode::NO_CONTENT)
}
