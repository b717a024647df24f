// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quiz question repository.
//!
//! Questions live under their quiz's directory and carry an `order_num`
//! that fixes their position; new questions are appended after the current
//! maximum.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DataStore, StorageError, StorageResult};

/// A single quiz question.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredQuestion {
    /// Unique question identifier (UUID).
    pub id: String,
    /// The quiz this question belongs to.
    pub quiz_id: String,
    /// Question prompt.
    pub question_text: String,
    /// Question type (defaults to `multiple_choice`).
    pub question_type: String,
    /// Answer options (shape depends on `question_type`).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub options: Option<serde_json::Value>,
    /// The correct answer.
    pub correct_answer: String,
    /// Explanation shown after answering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Position within the quiz (1-based).
    pub order_num: u32,
}

/// Repository for quiz questions.
pub struct QuestionRepository<'a> {
    storage: &'a DataStore,
}

impl<'a> QuestionRepository<'a> {
    /// Create a new QuestionRepository.
    pub fn new(storage: &'a DataStore) -> Self {
        Self { storage }
    }

    /// Check if a question exists.
    pub fn exists(&self, quiz_id: &str, question_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().quiz_question(quiz_id, question_id))
    }

    /// Get a question by id.
    pub fn get(&self, quiz_id: &str, question_id: &str) -> StorageResult<StoredQuestion> {
        let path = self.storage.paths().quiz_question(quiz_id, question_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Question {question_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new question.
    pub fn create(&self, question: &StoredQuestion) -> StorageResult<()> {
        if self.exists(&question.quiz_id, &question.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Question {}",
                question.id
            )));
        }

        self.storage.write_json(
            self.storage
                .paths()
                .quiz_question(&question.quiz_id, &question.id),
            question,
        )
    }

    /// Update an existing question.
    pub fn update(&self, question: &StoredQuestion) -> StorageResult<()> {
        if !self.exists(&question.quiz_id, &question.id) {
            return Err(StorageError::NotFound(format!("Question {}", question.id)));
        }

        self.storage.write_json(
            self.storage
                .paths()
                .quiz_question(&question.quiz_id, &question.id),
            question,
        )
    }

    /// Delete a question.
    pub fn delete(&self, quiz_id: &str, question_id: &str) -> StorageResult<()> {
        if !self.exists(quiz_id, question_id) {
            return Err(StorageError::NotFound(format!("Question {question_id}")));
        }

        self.storage
            .delete(self.storage.paths().quiz_question(quiz_id, question_id))
    }

    /// List a quiz's questions ordered by `order_num`.
    pub fn list_for_quiz(&self, quiz_id: &str) -> StorageResult<Vec<StoredQuestion>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().quiz_questions_dir(quiz_id), "json")?;

        let mut questions = Vec::new();
        for id in ids {
            if let Ok(question) = self.get(quiz_id, &id) {
                questions.push(question);
            }
        }

        questions.sort_by_key(|q| q.order_num);
        Ok(questions)
    }

    /// Next order number for a quiz (current max + 1, starting at 1).
    pub fn next_order_num(&self, quiz_id: &str) -> StorageResult<u32> {
        let questions = self.list_for_quiz(quiz_id)?;
        Ok(questions.iter().map(|q| q.order_num).max().unwrap_or(0) + 1)
    }
}
