// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit trail for security-relevant operations.
//!
//! Sign-ins, account changes and admin actions land in one JSONL file per
//! day under `audit/`. Every line is a self-contained JSON object, so the
//! trail can be grepped or shipped off-box without further parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DataStore, StorageError, StorageResult};

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Account events
    ProfileCreated,
    ProfileUpdated,
    AccessRequested,

    // Quiz events
    QuizCreated,
    QuizDeleted,
    QuestionCreated,
    QuestionUpdated,
    QuestionDeleted,

    // Result events
    ResultRecorded,

    // Auth events
    AuthSuccess,
    AuthFailure,
    PermissionDenied,

    // Admin events
    AdminAccess,
}

/// One line of the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event id.
    pub event_id: String,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub event_type: AuditEventType,
    /// Who did it, when known.
    pub user_id: Option<String>,
    /// Id of the affected resource.
    pub resource_id: Option<String>,
    /// Kind of the affected resource (profile, quiz, question, result).
    pub resource_type: Option<String>,
    /// Free-form context.
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Whether the operation went through.
    pub success: bool,
    /// Failure reason, when it did not.
    pub error: Option<String>,
}

impl AuditEvent {
    /// A fresh event of the given type, stamped now, assumed successful
    /// until [`failed`](Self::failed) says otherwise.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            resource_id: None,
            resource_type: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Attribute the event to a user.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Name the affected resource.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Attach free-form context.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Record the failure reason.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}

/// Append-only access to the audit trail.
pub struct AuditRepository<'a> {
    storage: &'a DataStore,
}

impl<'a> AuditRepository<'a> {
    pub fn new(storage: &'a DataStore) -> Self {
        Self { storage }
    }

    /// Append one event to its day's file.
    pub fn log(&self, event: &AuditEvent) -> StorageResult<()> {
        let day = event.timestamp.format("%Y-%m-%d").to_string();
        self.storage
            .append_line(self.storage.paths().audit_events_file(&day), event)
    }

    /// All events logged on `date` (`YYYY-MM-DD`), oldest first.
    pub fn read_events(&self, date: &str) -> StorageResult<Vec<AuditEvent>> {
        let raw = self
            .storage
            .read_to_string(self.storage.paths().audit_events_file(date))?;

        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StorageError::Json))
            .collect()
    }

    /// One day's events for one user.
    pub fn search_by_user(&self, user_id: &str, date: &str) -> StorageResult<Vec<AuditEvent>> {
        let mut events = self.read_events(date)?;
        events.retain(|e| e.user_id.as_deref() == Some(user_id));
        Ok(events)
    }
}

/// Log an audit event, ignoring logging failures.
#[macro_export]
macro_rules! audit_log {
    ($storage:expr, $event_type:expr, $user:expr) => {{
        let repo = $crate::storage::AuditRepository::new($storage);
        let event = $crate::storage::AuditEvent::new($event_type).with_user(&$user.id);
        let _ = repo.log(&event);
    }};
    ($storage:expr, $event_type:expr, $user:expr, $resource_type:expr, $resource_id:expr) => {{
        let repo = $crate::storage::AuditRepository::new($storage);
        let event = $crate::storage::AuditEvent::new($event_type)
            .with_user(&$user.id)
            .with_resource($resource_type, $resource_id);
        let _ = repo.log(&event);
    }};
}
