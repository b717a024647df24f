// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! eByte Academy - Role-Based Learning Management Service
//!
//! REST service for a learning platform: students take quizzes and view
//! their results, managers enroll students, admins validate accounts,
//! build quizzes and read platform analytics.
//!
//! ## Modules
//!
//! - `api` - REST handlers and the OpenAPI surface
//! - `auth` - Sessions, the auth state manager, access policy and guards
//! - `storage` - JSON file store, repositories and the audit trail
//! - `seed` - Demo account seeding

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod seed;
pub mod state;
pub mod storage;
