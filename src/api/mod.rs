// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::manager::CurrentUser,
    auth::roles::{AccountStatus, Role},
    models::{
        AnalyticsResponse, CourseStat, CreateQuestionRequest, CreateQuizRequest,
        CreateUserRequest, CreateUserResponse, DifficultyPerformance, LoginRequest, LoginResponse,
        ManagerSummary, QuizDetail, QuizSummary, RecentUser, RecordResultRequest,
        RequestAccessRequest, UpdateQuestionRequest, UpdateUserRequest, UserResponse,
    },
    state::AppState,
    storage::{Difficulty, StoredQuestion, StoredQuiz, StoredResult},
};

pub mod analytics;
pub mod auth;
pub mod health;
pub mod questions;
pub mod quizzes;
pub mod results;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/request-access", post(auth::request_access))
        .route("/users/me", get(auth::me))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", patch(users::update_user))
        .route(
            "/quizzes",
            get(quizzes::list_quizzes).post(quizzes::create_quiz),
        )
        .route(
            "/quizzes/{id}",
            get(quizzes::get_quiz).delete(quizzes::delete_quiz),
        )
        .route(
            "/quizzes/{id}/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route(
            "/quizzes/{id}/questions/{question_id}",
            axum::routing::put(questions::update_question).delete(questions::delete_question),
        )
        .route(
            "/results",
            get(results::list_results).post(results::record_result),
        )
        .route("/results/{id}", get(results::get_result))
        .route("/admin/analytics", get(analytics::get_analytics))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    // Layers apply bottom-up: every request gets an `x-request-id` before
    // the trace span opens, and the id is copied onto the response.
    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        auth::request_access,
        auth::me,
        users::list_users,
        users::create_user,
        users::update_user,
        quizzes::list_quizzes,
        quizzes::get_quiz,
        quizzes::create_quiz,
        quizzes::delete_quiz,
        questions::list_questions,
        questions::create_question,
        questions::update_question,
        questions::delete_question,
        results::record_result,
        results::list_results,
        results::get_result,
        analytics::get_analytics,
        health::health,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RequestAccessRequest,
            CurrentUser,
            Role,
            AccountStatus,
            UserResponse,
            ManagerSummary,
            CreateUserRequest,
            CreateUserResponse,
            UpdateUserRequest,
            QuizSummary,
            QuizDetail,
            CreateQuizRequest,
            CreateQuestionRequest,
            UpdateQuestionRequest,
            StoredQuiz,
            StoredQuestion,
            StoredResult,
            Difficulty,
            RecordResultRequest,
            AnalyticsResponse,
            CourseStat,
            DifficultyPerformance,
            RecentUser,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout and access requests"),
        (name = "Users", description = "Account listing and management"),
        (name = "Quizzes", description = "Quiz building and browsing"),
        (name = "Questions", description = "Quiz question management"),
        (name = "Results", description = "Recorded quiz attempts"),
        (name = "Analytics", description = "Platform statistics"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
