// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route guard.
//!
//! Wraps a page and decides, from the current auth snapshot and an optional
//! allowed-role list, whether to render it, show the loading placeholder,
//! or redirect. Navigation goes through an injected [`Navigator`] and fires
//! at most once per state transition, so a guard re-evaluated against an
//! unchanged state never loops.

use std::sync::Mutex;

use tokio::sync::watch;

use super::manager::AuthSnapshot;
use super::roles::Role;

/// Where unauthenticated visitors are sent.
pub const LOGIN_ROUTE: &str = "/login";

/// Where authenticated-but-unauthorized visitors are sent.
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state not settled yet: show a neutral placeholder.
    Loading,
    /// No user: go to the login surface.
    RedirectToLogin,
    /// User present but role not allowed: go to the unauthorized surface.
    RedirectToUnauthorized,
    /// Render the wrapped content.
    Render,
}

/// Navigation seam for redirect side effects.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Pure decision function over one snapshot.
pub fn evaluate(snapshot: &AuthSnapshot, allowed_roles: Option<&[Role]>) -> GuardDecision {
    if snapshot.is_loading {
        return GuardDecision::Loading;
    }

    let Some(user) = &snapshot.user else {
        return GuardDecision::RedirectToLogin;
    };

    if let Some(allowed) = allowed_roles {
        if !allowed.contains(&user.role) {
            return GuardDecision::RedirectToUnauthorized;
        }
    }

    GuardDecision::Render
}

/// Per-page gate over the auth state.
pub struct RouteGuard<N: Navigator> {
    allowed_roles: Option<Vec<Role>>,
    navigator: N,
    last: Mutex<Option<GuardDecision>>,
}

impl<N: Navigator> RouteGuard<N> {
    /// Create a guard. `allowed_roles: None` requires authentication only.
    pub fn new(navigator: N, allowed_roles: Option<Vec<Role>>) -> Self {
        Self {
            allowed_roles,
            navigator,
            last: Mutex::new(None),
        }
    }

    /// Evaluate one snapshot, navigating when the decision transitions
    /// into a redirect. Repeating the same state does not navigate again.
    pub fn apply(&self, snapshot: &AuthSnapshot) -> GuardDecision {
        let decision = evaluate(snapshot, self.allowed_roles.as_deref());

        let mut last = self.last.lock().expect("guard state poisoned");
        if *last != Some(decision) {
            match decision {
                GuardDecision::RedirectToLogin => self.navigator.navigate(LOGIN_ROUTE),
                GuardDecision::RedirectToUnauthorized => {
                    self.navigator.navigate(UNAUTHORIZED_ROUTE)
                }
                GuardDecision::Loading | GuardDecision::Render => {}
            }
            *last = Some(decision);
        }

        decision
    }

    /// Drive the guard from an auth state subscription.
    ///
    /// Evaluates the current state immediately, then re-evaluates on every
    /// change until the manager goes away.
    pub async fn watch(&self, mut rx: watch::Receiver<AuthSnapshot>) {
        let snapshot = rx.borrow().clone();
        self.apply(&snapshot);

        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow().clone();
            self.apply(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::manager::CurrentUser;
    use crate::auth::roles::AccountStatus;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingNavigator {
        calls: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.calls.lock().unwrap().push(path.to_string());
        }
    }

    impl Navigator for Arc<RecordingNavigator> {
        fn navigate(&self, path: &str) {
            self.as_ref().navigate(path);
        }
    }

    fn loading() -> AuthSnapshot {
        AuthSnapshot {
            user: None,
            is_loading: true,
        }
    }

    fn anonymous() -> AuthSnapshot {
        AuthSnapshot {
            user: None,
            is_loading: false,
        }
    }

    fn signed_in(role: Role) -> AuthSnapshot {
        AuthSnapshot {
            user: Some(CurrentUser {
                id: "sub-1".to_string(),
                email: "u@ebyte.edu".to_string(),
                name: "U Ser".to_string(),
                role,
                status: AccountStatus::Active,
            }),
            is_loading: false,
        }
    }

    #[test]
    fn loading_state_renders_placeholder_without_navigation() {
        let nav = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(nav.clone(), None);

        assert_eq!(guard.apply(&loading()), GuardDecision::Loading);
        assert!(nav.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn anonymous_redirects_to_login_once() {
        let nav = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(nav.clone(), None);

        assert_eq!(guard.apply(&anonymous()), GuardDecision::RedirectToLogin);
        assert_eq!(guard.apply(&anonymous()), GuardDecision::RedirectToLogin);

        let calls = nav.calls.lock().unwrap();
        assert_eq!(*calls, vec![LOGIN_ROUTE.to_string()]);
    }

    #[test]
    fn wrong_role_redirects_to_unauthorized_exactly_once() {
        let nav = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(nav.clone(), Some(vec![Role::Admin]));

        let snapshot = signed_in(Role::User);
        assert_eq!(
            guard.apply(&snapshot),
            GuardDecision::RedirectToUnauthorized
        );
        assert_eq!(
            guard.apply(&snapshot),
            GuardDecision::RedirectToUnauthorized
        );

        let calls = nav.calls.lock().unwrap();
        assert_eq!(*calls, vec![UNAUTHORIZED_ROUTE.to_string()]);
    }

    #[test]
    fn allowed_role_renders_without_navigation() {
        let nav = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(nav.clone(), Some(vec![Role::Admin, Role::Management]));

        assert_eq!(guard.apply(&signed_in(Role::Admin)), GuardDecision::Render);
        assert!(nav.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn no_role_requirement_admits_any_signed_in_user() {
        let nav = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(nav.clone(), None);

        assert_eq!(guard.apply(&signed_in(Role::User)), GuardDecision::Render);
        assert!(nav.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn transition_sequence_navigates_per_transition() {
        let nav = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(nav.clone(), None);

        guard.apply(&loading());
        guard.apply(&anonymous());
        guard.apply(&signed_in(Role::User));
        guard.apply(&anonymous());

        let calls = nav.calls.lock().unwrap();
        // One navigation per entry into the anonymous state, none for
        // loading or render.
        assert_eq!(
            *calls,
            vec![LOGIN_ROUTE.to_string(), LOGIN_ROUTE.to_string()]
        );
    }

    #[tokio::test]
    async fn watch_reevaluates_on_state_changes() {
        let nav = Arc::new(RecordingNavigator::default());
        let guard = Arc::new(RouteGuard::new(nav.clone(), Some(vec![Role::Admin])));

        let (tx, rx) = watch::channel(loading());
        let watcher = {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move { guard.watch(rx).await })
        };

        // One transition: loading settles into a role the page rejects.
        // Whether the watcher observes it via the initial borrow or the
        // change notification, it must redirect exactly once.
        tx.send(signed_in(Role::User)).unwrap();
        drop(tx);
        watcher.await.unwrap();

        let calls = nav.calls.lock().unwrap();
        assert_eq!(*calls, vec![UNAUTHORIZED_ROUTE.to_string()]);
    }
}
