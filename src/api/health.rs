// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Liveness and readiness probes.
//!
//! Liveness only proves the process answers. Readiness additionally
//! probes the data directory, since every endpoint depends on it.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Readiness report with per-dependency results.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// `ok` when every check passed, `degraded` otherwise.
    pub status: String,
    /// The individual checks.
    pub checks: HealthChecks,
}

/// Result of each dependency check.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// The process itself (always `ok` when it can answer at all).
    pub service: String,
    /// Data directory: `ok` or `unavailable`.
    pub data_dir: String,
}

/// Minimal body for the liveness probe.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn readiness_report(state: &AppState) -> (StatusCode, ReadyResponse) {
    let storage_ok = state.storage.health_check().is_ok();

    let report = ReadyResponse {
        status: (if storage_ok { "ok" } else { "degraded" }).to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            data_dir: (if storage_ok { "ok" } else { "unavailable" }).to_string(),
        },
    };

    let code = if storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, report)
}

/// Combined health check: 200 when every dependency answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (code, report) = readiness_report(&state);
    (code, Json(report))
}

/// Liveness probe: 200 whenever the process is up, dependencies unchecked.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe: 200 only when dependencies are usable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (code, report) = readiness_report(&state);
    (code, Json(report))
}
