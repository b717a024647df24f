// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quiz repository.
//!
//! Each quiz is a directory holding `meta.json` plus one JSON file per
//! question under `questions/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DataStore, StorageError, StorageResult};

/// Quiz difficulty level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a difficulty, accepting the legacy course-level aliases
    /// (beginner/intermediate/advanced).
    pub fn from_str(s: &str) -> Option<Difficulty> {
        match s.to_lowercase().as_str() {
            "easy" | "beginner" => Some(Difficulty::Easy),
            "medium" | "intermediate" => Some(Difficulty::Medium),
            "hard" | "advanced" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Quiz metadata stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredQuiz {
    /// Unique quiz identifier (UUID).
    pub id: String,
    /// Quiz title.
    pub title: String,
    /// Course category (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Time limit in minutes.
    pub duration_minutes: u32,
    /// Minimum passing score (percent).
    pub passing_score: u32,
    /// Subject id of the quiz author.
    pub created_by: String,
    /// When the quiz was created.
    pub created_at: DateTime<Utc>,
}

/// Repository for quiz metadata.
pub struct QuizRepository<'a> {
    storage: &'a DataStore,
}

impl<'a> QuizRepository<'a> {
    /// Create a new QuizRepository.
    pub fn new(storage: &'a DataStore) -> Self {
        Self { storage }
    }

    /// Check if a quiz exists.
    pub fn exists(&self, quiz_id: &str) -> bool {
        self.storage.exists(self.storage.paths().quiz_meta(quiz_id))
    }

    /// Get a quiz by id.
    pub fn get(&self, quiz_id: &str) -> StorageResult<StoredQuiz> {
        let path = self.storage.paths().quiz_meta(quiz_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Quiz {quiz_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new quiz.
    pub fn create(&self, quiz: &StoredQuiz) -> StorageResult<()> {
        if self.exists(&quiz.id) {
            return Err(StorageError::AlreadyExists(format!("Quiz {}", quiz.id)));
        }

        self.storage
            .write_json(self.storage.paths().quiz_meta(&quiz.id), quiz)
    }

    /// Delete a quiz and all of its questions.
    pub fn delete(&self, quiz_id: &str) -> StorageResult<()> {
        if !self.exists(quiz_id) {
            return Err(StorageError::NotFound(format!("Quiz {quiz_id}")));
        }

        self.storage.delete_dir(self.storage.paths().quiz_dir(quiz_id))
    }

    /// List quizzes, newest first, optionally filtered by category.
    pub fn list(&self, category: Option<&str>) -> StorageResult<Vec<StoredQuiz>> {
        let ids = self.storage.list_dirs(self.storage.paths().quizzes_dir())?;

        let mut quizzes = Vec::new();
        for id in ids {
            if let Ok(quiz) = self.get(&id) {
                if let Some(category) = category {
                    if quiz.category.as_deref() != Some(category) {
                        continue;
                    }
                }
                quizzes.push(quiz);
            }
        }

        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quizzes)
    }

    /// Count the questions attached to a quiz.
    pub fn question_count(&self, quiz_id: &str) -> usize {
        self.storage
            .list_files(self.storage.paths().quiz_questions_dir(quiz_id), "json")
            .map(|ids| ids.len())
            .unwrap_or(0)
    }
}
