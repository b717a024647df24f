// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the data store layout.

use std::path::{Path, PathBuf};

/// Base directory for all persistent data.
/// Overridden by the `DATA_DIR` environment variable at startup.
pub const DATA_ROOT: &str = "/data";

/// Storage path utilities for the data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Profile Paths ==========

    /// Directory containing all profiles.
    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    /// Path to a specific profile file.
    pub fn profile(&self, subject_id: &str) -> PathBuf {
        self.profiles_dir().join(format!("{subject_id}.json"))
    }

    // ========== Account Paths ==========

    /// Directory containing all credential accounts.
    pub fn accounts_dir(&self) -> PathBuf {
        self.root.join("accounts")
    }

    /// Path to a specific account file.
    pub fn account(&self, subject_id: &str) -> PathBuf {
        self.accounts_dir().join(format!("{subject_id}.json"))
    }

    // ========== Quiz Paths ==========

    /// Directory containing all quizzes.
    pub fn quizzes_dir(&self) -> PathBuf {
        self.root.join("quizzes")
    }

    /// Directory for a specific quiz.
    pub fn quiz_dir(&self, quiz_id: &str) -> PathBuf {
        self.quizzes_dir().join(quiz_id)
    }

    /// Path to quiz metadata file.
    pub fn quiz_meta(&self, quiz_id: &str) -> PathBuf {
        self.quiz_dir(quiz_id).join("meta.json")
    }

    /// Directory for a quiz's questions.
    pub fn quiz_questions_dir(&self, quiz_id: &str) -> PathBuf {
        self.quiz_dir(quiz_id).join("questions")
    }

    /// Path to a specific question file.
    pub fn quiz_question(&self, quiz_id: &str, question_id: &str) -> PathBuf {
        self.quiz_questions_dir(quiz_id)
            .join(format!("{question_id}.json"))
    }

    // ========== Quiz Result Paths ==========

    /// Directory containing all quiz results.
    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    /// Path to a specific quiz result file.
    pub fn result(&self, result_id: &str) -> PathBuf {
        self.results_dir().join(format!("{result_id}.json"))
    }

    // ========== Audit Log Paths ==========

    /// Directory containing audit logs.
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit")
    }

    /// Directory for a specific date's audit logs.
    pub fn audit_date_dir(&self, date: &str) -> PathBuf {
        self.audit_dir().join(date)
    }

    /// Path to a daily audit events file (JSONL format).
    pub fn audit_events_file(&self, date: &str) -> PathBuf {
        self.audit_date_dir(date).join("events.jsonl")
    }
}
