// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the data store.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using the DataStore for all file operations.

pub mod accounts;
pub mod profiles;
pub mod questions;
pub mod quizzes;
pub mod results;

pub use accounts::{AccountRepository, StoredAccount};
pub use profiles::{ProfileFilter, ProfileRepository, StoredProfile};
pub use questions::{QuestionRepository, StoredQuestion};
pub use quizzes::{Difficulty, QuizRepository, StoredQuiz};
pub use results::{ResultRepository, StoredResult};
