// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Platform analytics (staff view).
//!
//! Plain aggregation over profiles and recorded results; nothing here is
//! precomputed or cached.

use std::collections::HashMap;

use axum::{extract::State, Json};
use chrono::{Datelike, Utc};

use crate::{
    audit_log,
    auth::{AccountStatus, Role, StaffOnly},
    error::ApiError,
    models::{AnalyticsResponse, CourseStat, DifficultyPerformance, RecentUser},
    state::AppState,
    storage::{
        AuditEventType, Difficulty, ProfileRepository, QuizRepository, ResultRepository,
    },
};

/// How many top categories the dashboard shows.
const TOP_COURSES: usize = 4;

/// How many recent users the dashboard shows.
const RECENT_USERS: usize = 5;

/// Aggregate platform statistics.
#[utoipa::path(
    get,
    path = "/v1/admin/analytics",
    tag = "Analytics",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Platform statistics", body = AnalyticsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (staff required)"),
    )
)]
pub async fn get_analytics(
    StaffOnly(user): StaffOnly,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let profiles = ProfileRepository::new(&state.storage)
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to load profiles: {e}")))?;

    let now = Utc::now();
    let start_of_month = now
        .date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or(now);

    let total_users = profiles.len();
    let active_users = profiles
        .iter()
        .filter(|p| p.role == Role::User && p.status == AccountStatus::Active)
        .count();
    let pending_validation = profiles
        .iter()
        .filter(|p| p.status == AccountStatus::Pending)
        .count();
    let management_count = profiles.iter().filter(|p| p.role.is_staff()).count();
    let new_users_count = profiles
        .iter()
        .filter(|p| p.created_at >= start_of_month)
        .count();

    // Profiles come back newest first.
    let recent_users: Vec<RecentUser> = profiles
        .into_iter()
        .take(RECENT_USERS)
        .map(RecentUser::from)
        .collect();

    let results = ResultRepository::new(&state.storage)
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to load results: {e}")))?;

    let total_quizzes_taken = results.len();
    let total_score: u64 = results.iter().map(|r| u64::from(r.score)).sum();
    let avg_score = if total_quizzes_taken > 0 {
        (total_score as f64 / total_quizzes_taken as f64).round() as u32
    } else {
        0
    };

    // Attempts grouped by quiz category and by difficulty. Results for
    // quizzes deleted since the attempt count as uncategorized.
    let quizzes = QuizRepository::new(&state.storage);
    let mut category_counts: HashMap<String, usize> = HashMap::new();
    let mut difficulty_scores: HashMap<Difficulty, (u64, usize)> = HashMap::new();

    for result in &results {
        let quiz = quizzes.get(&result.quiz_id).ok();

        let category = quiz
            .as_ref()
            .and_then(|q| q.category.clone())
            .unwrap_or_else(|| "Uncategorized".to_string());
        *category_counts.entry(category).or_insert(0) += 1;

        let difficulty = quiz.map(|q| q.difficulty).unwrap_or_default();
        let entry = difficulty_scores.entry(difficulty).or_insert((0, 0));
        entry.0 += u64::from(result.score);
        entry.1 += 1;
    }

    let mut top_courses: Vec<CourseStat> = category_counts
        .into_iter()
        .map(|(name, students)| CourseStat { name, students })
        .collect();
    top_courses.sort_by(|a, b| b.students.cmp(&a.students).then(a.name.cmp(&b.name)));
    top_courses.truncate(TOP_COURSES);

    let performance_by_difficulty = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        .into_iter()
        .map(|level| {
            let (total, count) = difficulty_scores.get(&level).copied().unwrap_or((0, 0));
            DifficultyPerformance {
                level,
                score: if count > 0 {
                    (total as f64 / count as f64).round() as u32
                } else {
                    0
                },
            }
        })
        .collect();

    audit_log!(&state.storage, AuditEventType::AdminAccess, &user);

    Ok(Json(AnalyticsResponse {
        active_users,
        total_users,
        management_count,
        pending_validation,
        new_users_count,
        avg_score,
        total_quizzes_taken,
        top_courses,
        performance_by_difficulty,
        recent_users,
    }))
}
