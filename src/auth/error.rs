// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors raised while resolving a request's bearer token to a user.
//!
//! Everything here renders as a `{error, error_code}` JSON body: a stable
//! machine-readable code plus a sentence for humans.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token does not map to a live session (unknown, revoked or expired)
    InvalidSession,
    /// Session subject has no profile record
    ProfileNotFound,
    /// Internal error
    InternalError(String),
    /// Insufficient permissions
    InsufficientPermissions,
}

impl AuthError {
    /// Stable code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidSession => "invalid_session",
            AuthError::ProfileNotFound => "profile_not_found",
            AuthError::InternalError(_) => "internal_error",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// HTTP status the error maps to: 401 until the user is known, 403
    /// once they are but the role falls short.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Missing Authorization header"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Authorization header must be of the form 'Bearer <token>'")
            }
            AuthError::InvalidSession => {
                write!(f, "Session token is unknown, revoked or expired")
            }
            AuthError::ProfileNotFound => write!(f, "No profile exists for this session"),
            AuthError::InternalError(msg) => write!(f, "Authentication failed: {msg}"),
            AuthError::InsufficientPermissions => {
                write!(f, "This operation requires a higher role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "error_code": self.code(),
        }));
        (self.status(), body).into_response()
    }
}
