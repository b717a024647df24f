// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route access policy.
//!
//! A static table maps each role to the route prefixes it may enter.
//! `can_access` is pure and total: any `(role, path)` pair yields an
//! answer, and unknown paths are simply denied.

use super::roles::Role;

/// Route prefixes reachable by admins.
const ADMIN_ROUTES: &[&str] = &[
    "/admin",
    "/admin/dashboard",
    "/admin/validate-users",
    "/admin/quiz-builder",
    "/admin/learning-materials",
    "/admin/analytics",
    "/dashboard",
];

/// Route prefixes reachable by management.
const MANAGEMENT_ROUTES: &[&str] = &[
    "/management",
    "/management/dashboard",
    "/management/add-users",
    "/management/user-list",
    "/dashboard",
];

/// Route prefixes reachable by students.
const USER_ROUTES: &[&str] = &["/dashboard", "/courses", "/exercises", "/quizzes", "/results"];

/// The route prefixes a role may enter.
pub fn allowed_prefixes(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => ADMIN_ROUTES,
        Role::Management => MANAGEMENT_ROUTES,
        Role::User => USER_ROUTES,
    }
}

/// Whether `role` may enter `path`.
///
/// True iff the path starts with one of the role's configured prefixes.
pub fn can_access(role: Role, path: &str) -> bool {
    allowed_prefixes(role)
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_prefixes() {
        for role in [Role::Admin, Role::Management, Role::User] {
            assert!(!allowed_prefixes(role).is_empty());
        }
    }

    #[test]
    fn admin_reaches_admin_area() {
        assert!(can_access(Role::Admin, "/admin/dashboard"));
        assert!(can_access(Role::Admin, "/admin/quiz-builder"));
        assert!(can_access(Role::Admin, "/dashboard"));
    }

    #[test]
    fn student_is_denied_admin_area() {
        assert!(!can_access(Role::User, "/admin/dashboard"));
        assert!(!can_access(Role::User, "/management/add-users"));
        assert!(can_access(Role::User, "/quizzes"));
        assert!(can_access(Role::User, "/results"));
    }

    #[test]
    fn management_area_is_management_only() {
        assert!(can_access(Role::Management, "/management/add-users"));
        assert!(can_access(Role::Management, "/management/user-list"));
        assert!(!can_access(Role::Management, "/admin/quiz-builder"));
        assert!(!can_access(Role::User, "/management"));
    }

    #[test]
    fn unknown_paths_are_denied_for_everyone() {
        for role in [Role::Admin, Role::Management, Role::User] {
            assert!(!can_access(role, "/definitely-not-a-route"));
            assert!(!can_access(role, ""));
        }
    }

    #[test]
    fn prefix_matching_covers_subpaths() {
        assert!(can_access(Role::Admin, "/admin/quiz-builder/42"));
        assert!(can_access(Role::User, "/courses/rust-101"));
    }
}
