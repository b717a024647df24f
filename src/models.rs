// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`/`Deserialize` and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Auth**: login, logout and access-request payloads
//! - **Users**: profile listings and staff-driven account management
//! - **Quizzes**: quiz and question CRUD
//! - **Results**: recorded quiz attempts
//! - **Analytics**: aggregated platform statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::{AccountStatus, CurrentUser, Role};
use crate::storage::{Difficulty, StoredProfile, StoredQuestion, StoredQuiz};

// =============================================================================
// Auth Models
// =============================================================================

/// Credentials for `POST /v1/auth/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the bearer token plus the resolved user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests.
    pub access_token: String,
    /// The resolved application-level user.
    pub user: CurrentUser,
}

/// Request to register a pending account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RequestAccessRequest {
    pub email: String,
    /// Full name; split into first and last name on the server.
    pub name: String,
}

// =============================================================================
// User Models
// =============================================================================

/// Summary of the manager who enrolled a user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ManagerSummary {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute_name: Option<String>,
}

/// A user as returned by the users endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    /// Details of the enrolling manager, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<ManagerSummary>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// Build from a profile, optionally attaching the enrolling manager.
    pub fn from_profile(profile: StoredProfile, manager: Option<ManagerSummary>) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            role: profile.role,
            status: profile.status,
            institute_name: profile.institute_name,
            added_by: profile.added_by,
            manager,
            created_at: profile.created_at,
        }
    }
}

/// Query parameters for `GET /v1/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserQuery {
    /// Filter by status (active/pending/rejected).
    pub status: Option<String>,
    /// Filter by role; `all` disables the filter.
    pub role: Option<String>,
}

/// Staff request to create a user account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    /// Full name; split into first and last name on the server.
    pub name: String,
    /// Role for the new account (defaults to `user`).
    pub role: Option<String>,
    /// Initial password; a random one is generated when omitted.
    pub password: Option<String>,
    /// Institute name, captured for management accounts.
    pub institute_name: Option<String>,
}

/// Response for a created user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub user_id: String,
}

/// Admin request to update a user's profile.
///
/// Only the provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub status: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// =============================================================================
// Quiz Models
// =============================================================================

/// A quiz summary with its question count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizSummary {
    #[serde(flatten)]
    pub quiz: StoredQuiz,
    /// Number of questions attached to the quiz.
    pub question_count: usize,
}

/// A quiz with its questions embedded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: StoredQuiz,
    pub questions: Vec<StoredQuestion>,
}

/// Query parameters for `GET /v1/quizzes`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct QuizQuery {
    /// Filter by course category.
    pub category: Option<String>,
}

/// Request to create a quiz.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateQuizRequest {
    pub title: String,
    /// Course category (the builder sends `courseId`).
    #[serde(alias = "courseId")]
    pub category: Option<String>,
    /// Difficulty, accepting the course-level aliases
    /// beginner/intermediate/advanced (the builder sends `level`).
    #[serde(alias = "level")]
    pub difficulty: Option<String>,
    pub description: Option<String>,
    /// Time limit in minutes (defaults to 30).
    pub duration_minutes: Option<u32>,
    /// Minimum passing score in percent (defaults to 60).
    #[serde(alias = "passingScore")]
    pub passing_score: Option<u32>,
}

/// Request to add a question to a quiz.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateQuestionRequest {
    pub question_text: String,
    /// Question type (defaults to `multiple_choice`).
    pub question_type: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub options: Option<serde_json::Value>,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

/// Request to update a question. Only the provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateQuestionRequest {
    pub question_text: Option<String>,
    pub question_type: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub options: Option<serde_json::Value>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
}

// =============================================================================
// Result Models
// =============================================================================

/// Request to record a quiz attempt.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordResultRequest {
    pub quiz_id: String,
    /// Score in percent (0-100).
    pub score: u32,
}

// =============================================================================
// Analytics Models
// =============================================================================

/// One category with its attempt count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseStat {
    pub name: String,
    pub students: usize,
}

/// Average score for one difficulty level.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DifficultyPerformance {
    pub level: Difficulty,
    pub score: u32,
}

/// A recently created user, as shown on the analytics dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl From<StoredProfile> for RecentUser {
    fn from(profile: StoredProfile) -> Self {
        Self {
            id: profile.id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            role: profile.role,
            status: profile.status,
            created_at: profile.created_at,
        }
    }
}

/// Aggregated platform statistics.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    /// Active students.
    pub active_users: usize,
    /// All profiles, any role or status.
    pub total_users: usize,
    /// Admin plus management accounts.
    pub management_count: usize,
    /// Profiles awaiting validation.
    pub pending_validation: usize,
    /// Profiles created since the start of the current month.
    pub new_users_count: usize,
    /// Mean score over all recorded attempts, rounded.
    pub avg_score: u32,
    /// Total recorded attempts.
    pub total_quizzes_taken: usize,
    /// Most-attempted categories (top four).
    pub top_courses: Vec<CourseStat>,
    /// Average score per difficulty level.
    pub performance_by_difficulty: Vec<DifficultyPerformance>,
    /// Five most recently created profiles.
    pub recent_users: Vec<RecentUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_quiz_request_accepts_builder_aliases() {
        let request: CreateQuizRequest = serde_json::from_str(
            r#"{"title":"Borrowing","courseId":"rust","level":"beginner","passingScore":70}"#,
        )
        .unwrap();

        assert_eq!(request.category.as_deref(), Some("rust"));
        assert_eq!(request.difficulty.as_deref(), Some("beginner"));
        assert_eq!(request.passing_score, Some(70));
    }

    #[test]
    fn quiz_summary_flattens_quiz_fields() {
        let summary = QuizSummary {
            quiz: StoredQuiz {
                id: "q1".to_string(),
                title: "Lifetimes".to_string(),
                category: None,
                difficulty: Difficulty::Hard,
                description: None,
                duration_minutes: 30,
                passing_score: 60,
                created_by: "admin-1".to_string(),
                created_at: Utc::now(),
            },
            question_count: 4,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], "q1");
        assert_eq!(json["question_count"], 4);
        assert_eq!(json["difficulty"], "hard");
    }

    #[test]
    fn user_response_carries_manager_details() {
        let profile = StoredProfile {
            id: "sub-1".to_string(),
            email: "s@ebyte.edu".to_string(),
            first_name: "Student".to_string(),
            last_name: "One".to_string(),
            role: Role::User,
            status: AccountStatus::Pending,
            institute_name: None,
            added_by: Some("mgr-1".to_string()),
            created_at: Utc::now(),
        };

        let response = UserResponse::from_profile(
            profile,
            Some(ManagerSummary {
                first_name: "Mana".to_string(),
                last_name: "Ger".to_string(),
                institute_name: Some("North Campus".to_string()),
            }),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["manager"]["institute_name"], "North Campus");
        assert_eq!(json["added_by"], "mgr-1");
    }
}
