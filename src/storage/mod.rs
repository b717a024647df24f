// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Everything the service persists lives as plain JSON under one data
//! directory (`DATA_DIR`, default `/data`); each repository owns one
//! entity type over the shared [`DataStore`].
//!
//! ## Layout
//!
//! ```text
//! /data/
//!   profiles/{subject_id}.json    # Identity records (role, status, name)
//!   accounts/{subject_id}.json    # Credential digests (session store only)
//!   quizzes/{quiz_id}/
//!     meta.json                   # Quiz metadata
//!     questions/{id}.json         # One file per question
//!   results/{result_id}.json      # Recorded quiz attempts
//!   audit/{date}/events.jsonl     # Daily audit logs
//! ```

pub mod audit;
pub mod ownership;
pub mod paths;
pub mod repository;
pub mod store;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use ownership::{OwnedResource, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use repository::{
    AccountRepository, Difficulty, ProfileFilter, ProfileRepository, QuestionRepository,
    QuizRepository, ResultRepository, StoredAccount, StoredProfile, StoredQuestion, StoredQuiz,
    StoredResult,
};
pub use store::{DataStore, StorageError, StorageResult};
