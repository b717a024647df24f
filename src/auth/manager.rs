// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth state manager.
//!
//! Owns the single process-wide `Option<CurrentUser>` + `is_loading` pair
//! and is the only writer of it. Session-change events and explicit
//! `login`/`logout` calls funnel through one publish path; observers read
//! the state through a watch channel.
//!
//! ## Ordering
//!
//! Session events are processed in delivery order, but a profile lookup
//! started by an older event may finish after one started by a newer
//! event. Every resolution is tagged with a sequence number taken in
//! delivery order, and a completed resolution publishes only if it is
//! still the latest issued. The newest event always wins, regardless of
//! completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use utoipa::ToSchema;

use crate::auth::roles::{AccountStatus, Role};
use crate::auth::session::{
    generate_password, Session, SessionChange, SessionEvent, SessionStore, SessionStoreError,
    SignUpMetadata,
};
use crate::storage::{DataStore, ProfileRepository, StorageError, StoredProfile};

/// The application-level view of the signed-in user.
///
/// Derived from a session plus its profile; never persisted. This is the
/// single source of truth route guards and handlers consult.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct CurrentUser {
    /// Subject id.
    pub id: String,
    /// Account email.
    pub email: String,
    /// Display name (first and last name joined, trimmed).
    pub name: String,
    /// Authorization role.
    pub role: Role,
    /// Validation status.
    pub status: AccountStatus,
}

impl CurrentUser {
    /// Build the derived user from a profile record.
    pub fn from_profile(profile: &StoredProfile) -> Self {
        Self {
            id: profile.id.clone(),
            email: profile.email.clone(),
            name: profile.display_name(),
            role: profile.role,
            status: profile.status,
        }
    }
}

/// Profile lookup boundary used during session resolution.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for a subject id; `Ok(None)` when absent.
    async fn get_by_id(&self, subject_id: &str) -> Result<Option<StoredProfile>, StorageError>;
}

#[async_trait]
impl ProfileStore for DataStore {
    async fn get_by_id(&self, subject_id: &str) -> Result<Option<StoredProfile>, StorageError> {
        match ProfileRepository::new(self).get(subject_id) {
            Ok(profile) => Ok(Some(profile)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Published auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// The resolved user, `None` when anonymous.
    pub user: Option<CurrentUser>,
    /// True only until the startup resolution has published.
    pub is_loading: bool,
}

impl AuthSnapshot {
    fn uninitialized() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    fn anonymous() -> Self {
        Self {
            user: None,
            is_loading: false,
        }
    }

    fn authenticated(user: CurrentUser) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }
}

/// Owner of the session-to-user projection.
///
/// Create with [`AuthStateManager::new`], then call [`init`] once to run
/// the startup resolution. Call [`shutdown`] to stop the event loop.
///
/// [`init`]: AuthStateManager::init
/// [`shutdown`]: AuthStateManager::shutdown
pub struct AuthStateManager {
    sessions: Arc<dyn SessionStore>,
    profiles: Arc<dyn ProfileStore>,
    /// Latest issued resolution sequence number.
    seq: AtomicU64,
    /// Serializes the check-then-publish step.
    publish_lock: Mutex<()>,
    state: watch::Sender<AuthSnapshot>,
    event_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl AuthStateManager {
    /// Create the manager and start listening for session changes.
    ///
    /// The returned manager is still Uninitialized (`is_loading` true);
    /// call [`init`](Self::init) to resolve any pre-existing session.
    pub fn new(sessions: Arc<dyn SessionStore>, profiles: Arc<dyn ProfileStore>) -> Arc<Self> {
        let (state, _) = watch::channel(AuthSnapshot::uninitialized());

        let manager = Arc::new(Self {
            sessions,
            profiles,
            seq: AtomicU64::new(0),
            publish_lock: Mutex::new(()),
            state,
            event_task: Mutex::new(None),
        });

        let rx = manager.sessions.subscribe();
        let task = tokio::spawn(Arc::clone(&manager).run_event_loop(rx));
        *manager.event_task.lock().expect("event task lock poisoned") = Some(task);

        manager
    }

    /// Startup resolution: resolve an existing session, or settle Anonymous.
    pub async fn init(&self) {
        let seq = self.next_seq();
        match self.sessions.get_session().await {
            Some(session) => self.resolve_and_publish(seq, &session).await,
            None => self.publish(seq, AuthSnapshot::anonymous()),
        }
    }

    /// Stop the session-change event loop.
    pub fn shutdown(&self) {
        if let Some(task) = self
            .event_task
            .lock()
            .expect("event task lock poisoned")
            .take()
        {
            task.abort();
        }
    }

    /// The current resolved user, if any.
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.borrow().user.clone()
    }

    /// Whether the startup resolution is still in flight.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Subscribe to auth state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// Sign in and resolve the user before returning.
    ///
    /// The profile is resolved synchronously here rather than waiting for
    /// the session-change event, so a caller that reads `current_user`
    /// right after `login` resolves never sees a stale `None`.
    ///
    /// On credential failure the error propagates and state is unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionStoreError> {
        let session = self.sessions.sign_in_with_password(email, password).await?;

        let seq = self.next_seq();
        self.resolve_and_publish(seq, &session).await;
        Ok(())
    }

    /// Sign out and publish Anonymous immediately.
    ///
    /// Idempotent: calling without a session is a no-op that still settles
    /// on Anonymous.
    pub async fn logout(&self) -> Result<(), SessionStoreError> {
        let result = self.sessions.sign_out().await;

        let seq = self.next_seq();
        self.publish(seq, AuthSnapshot::anonymous());
        result
    }

    /// Request access: register a pending account under a throwaway
    /// password. Does not change the auth state.
    pub async fn request_access(&self, email: &str, name: &str) -> Result<(), SessionStoreError> {
        let (first_name, last_name) = split_name(name);
        self.sessions
            .sign_up(
                email,
                &generate_password(),
                SignUpMetadata {
                    first_name,
                    last_name,
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a snapshot unless a newer resolution has been issued.
    fn publish(&self, seq: u64, snapshot: AuthSnapshot) {
        let _guard = self.publish_lock.lock().expect("publish lock poisoned");
        if seq == self.seq.load(Ordering::SeqCst) {
            self.state.send_replace(snapshot);
        }
    }

    /// Resolve a session to a user and publish the outcome.
    ///
    /// Lookup failures degrade to Anonymous and are logged; they are never
    /// surfaced to callers.
    async fn resolve_and_publish(&self, seq: u64, session: &Session) {
        let snapshot = match self.profiles.get_by_id(&session.subject_id).await {
            Ok(Some(profile)) => AuthSnapshot::authenticated(CurrentUser::from_profile(&profile)),
            Ok(None) => {
                tracing::warn!(
                    subject_id = %session.subject_id,
                    "no profile for session subject, treating as anonymous"
                );
                AuthSnapshot::anonymous()
            }
            Err(e) => {
                tracing::warn!(
                    subject_id = %session.subject_id,
                    error = %e,
                    "profile resolution failed, treating as anonymous"
                );
                AuthSnapshot::anonymous()
            }
        };

        self.publish(seq, snapshot);
    }

    async fn run_event_loop(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<SessionChange>,
    ) {
        loop {
            match rx.recv().await {
                Ok(change) => {
                    match (change.event, change.session) {
                        (SessionEvent::SignedOut, _) => {
                            // Sign-out is terminal: publish without waiting
                            // on any in-flight resolution.
                            let seq = self.next_seq();
                            self.publish(seq, AuthSnapshot::anonymous());
                        }
                        (_, Some(session)) => {
                            // Sequence numbers are taken here, in delivery
                            // order; the lookup itself may finish late and
                            // will then be discarded on publish.
                            let seq = self.next_seq();
                            let manager = Arc::clone(&self);
                            tokio::spawn(async move {
                                manager.resolve_and_publish(seq, &session).await;
                            });
                        }
                        (_, None) => {}
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

fn split_name(name: &str) -> (String, String) {
    let mut parts = name.trim().split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::LocalSessionStore;
    use crate::storage::{AccountRepository, StoragePaths};
    use chrono::Duration;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    fn make_storage() -> (TempDir, DataStore) {
        let temp = TempDir::new().unwrap();
        let mut storage = DataStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    async fn register(
        sessions: &LocalSessionStore,
        email: &str,
        password: &str,
        role: Role,
    ) -> String {
        sessions
            .sign_up(
                email,
                password,
                SignUpMetadata {
                    first_name: "Alex".to_string(),
                    last_name: "Moreau".to_string(),
                    role: Some(role),
                    status: Some(AccountStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    fn manager_over(storage: &DataStore) -> (Arc<LocalSessionStore>, Arc<AuthStateManager>) {
        let sessions = Arc::new(LocalSessionStore::new(
            storage.clone(),
            Duration::minutes(30),
        ));
        let manager = AuthStateManager::new(
            sessions.clone() as Arc<dyn SessionStore>,
            Arc::new(storage.clone()) as Arc<dyn ProfileStore>,
        );
        (sessions, manager)
    }

    /// ProfileStore that sleeps before answering, to force out-of-order
    /// resolution completions.
    struct SlowProfiles {
        storage: DataStore,
        delay: StdDuration,
    }

    #[async_trait]
    impl ProfileStore for SlowProfiles {
        async fn get_by_id(
            &self,
            subject_id: &str,
        ) -> Result<Option<StoredProfile>, StorageError> {
            tokio::time::sleep(self.delay).await;
            self.storage.get_by_id(subject_id).await
        }
    }

    /// ProfileStore that never finds anything.
    struct NoProfiles;

    #[async_trait]
    impl ProfileStore for NoProfiles {
        async fn get_by_id(&self, _: &str) -> Result<Option<StoredProfile>, StorageError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn fresh_start_without_session_settles_anonymous() {
        let (_temp, storage) = make_storage();
        let (_sessions, manager) = manager_over(&storage);

        // Uninitialized until the startup resolution runs.
        assert!(manager.is_loading());
        assert!(manager.current_user().is_none());

        manager.init().await;

        assert!(!manager.is_loading());
        assert!(manager.current_user().is_none());
        manager.shutdown();
    }

    #[tokio::test]
    async fn startup_resolves_existing_session() {
        let (_temp, storage) = make_storage();
        let sessions = Arc::new(LocalSessionStore::new(
            storage.clone(),
            Duration::minutes(30),
        ));
        register(&sessions, "admin@ebyte.edu", "password", Role::Admin).await;
        sessions
            .sign_in_with_password("admin@ebyte.edu", "password")
            .await
            .unwrap();

        let manager = AuthStateManager::new(
            sessions.clone() as Arc<dyn SessionStore>,
            Arc::new(storage.clone()) as Arc<dyn ProfileStore>,
        );
        manager.init().await;

        let user = manager.current_user().expect("resolved user");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, "Alex Moreau");
        manager.shutdown();
    }

    #[tokio::test]
    async fn login_publishes_before_returning() {
        let (_temp, storage) = make_storage();
        let (sessions, manager) = manager_over(&storage);
        register(&sessions, "admin@ebyte.edu", "password", Role::Admin).await;
        manager.init().await;

        manager.login("admin@ebyte.edu", "password").await.unwrap();

        // No waiting on the async event path: the user is already there.
        let user = manager.current_user().expect("user set after login");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.email, "admin@ebyte.edu");
        manager.shutdown();
    }

    #[tokio::test]
    async fn failed_login_leaves_state_unchanged() {
        let (_temp, storage) = make_storage();
        let (sessions, manager) = manager_over(&storage);
        register(&sessions, "x@x.com", "right", Role::User).await;
        manager.init().await;

        let result = manager.login("x@x.com", "wrong").await;
        assert!(matches!(result, Err(SessionStoreError::InvalidCredentials)));
        assert!(manager.current_user().is_none());
        assert!(!manager.is_loading());
        manager.shutdown();
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (_temp, storage) = make_storage();
        let (sessions, manager) = manager_over(&storage);
        register(&sessions, "s@ebyte.edu", "password", Role::User).await;
        manager.init().await;

        manager.login("s@ebyte.edu", "password").await.unwrap();
        assert!(manager.current_user().is_some());

        manager.logout().await.unwrap();
        assert!(manager.current_user().is_none());

        // Second logout neither errors nor changes the outcome.
        manager.logout().await.unwrap();
        assert!(manager.current_user().is_none());
        manager.shutdown();
    }

    #[tokio::test]
    async fn missing_profile_degrades_to_anonymous() {
        let (_temp, storage) = make_storage();
        let sessions = Arc::new(LocalSessionStore::new(
            storage.clone(),
            Duration::minutes(30),
        ));
        register(&sessions, "ghost@ebyte.edu", "password", Role::User).await;

        let manager = AuthStateManager::new(
            sessions.clone() as Arc<dyn SessionStore>,
            Arc::new(NoProfiles) as Arc<dyn ProfileStore>,
        );
        manager.init().await;

        // Sign-in succeeds but resolution finds no profile: no error, just
        // Anonymous.
        manager.login("ghost@ebyte.edu", "password").await.unwrap();
        assert!(manager.current_user().is_none());
        assert!(!manager.is_loading());
        manager.shutdown();
    }

    #[tokio::test]
    async fn sign_out_wins_over_slower_earlier_resolution() {
        let (_temp, storage) = make_storage();
        let sessions = Arc::new(LocalSessionStore::new(
            storage.clone(),
            Duration::minutes(30),
        ));
        register(&sessions, "s@ebyte.edu", "password", Role::User).await;

        let manager = AuthStateManager::new(
            sessions.clone() as Arc<dyn SessionStore>,
            Arc::new(SlowProfiles {
                storage: storage.clone(),
                delay: StdDuration::from_millis(100),
            }) as Arc<dyn ProfileStore>,
        );
        manager.init().await;

        // Drive state through events only: a sign-in whose resolution is
        // slow, then an immediate sign-out.
        sessions
            .sign_in_with_password("s@ebyte.edu", "password")
            .await
            .unwrap();
        sessions.sign_out().await.unwrap();

        // Give the slow resolution time to complete (and be discarded).
        tokio::time::sleep(StdDuration::from_millis(300)).await;

        assert!(
            manager.current_user().is_none(),
            "stale resolution must not overwrite the newer sign-out"
        );
        manager.shutdown();
    }

    #[tokio::test]
    async fn watchers_observe_sign_out() {
        let (_temp, storage) = make_storage();
        let (sessions, manager) = manager_over(&storage);
        register(&sessions, "s@ebyte.edu", "password", Role::User).await;
        manager.init().await;

        let mut rx = manager.subscribe();
        manager.login("s@ebyte.edu", "password").await.unwrap();
        rx.wait_for(|s| s.user.is_some()).await.unwrap();

        manager.logout().await.unwrap();
        rx.wait_for(|s| s.user.is_none()).await.unwrap();
        manager.shutdown();
    }

    #[tokio::test]
    async fn request_access_creates_pending_profile_without_state_change() {
        let (_temp, storage) = make_storage();
        let (_sessions, manager) = manager_over(&storage);
        manager.init().await;

        manager
            .request_access("newcomer@ebyte.edu", "Jordan Q Reyes")
            .await
            .unwrap();

        assert!(manager.current_user().is_none());

        let profile = ProfileRepository::new(&storage)
            .find_by_email("newcomer@ebyte.edu")
            .unwrap();
        assert_eq!(profile.first_name, "Jordan");
        assert_eq!(profile.last_name, "Q Reyes");
        assert_eq!(profile.status, AccountStatus::Pending);
        assert_eq!(profile.role, Role::User);
        manager.shutdown();
    }

    #[tokio::test]
    async fn request_access_propagates_registration_errors() {
        let (_temp, storage) = make_storage();
        let (sessions, manager) = manager_over(&storage);
        register(&sessions, "taken@ebyte.edu", "password", Role::User).await;
        manager.init().await;

        let result = manager.request_access("taken@ebyte.edu", "Some One").await;
        assert!(matches!(result, Err(SessionStoreError::EmailTaken(_))));
        manager.shutdown();
    }

    #[tokio::test]
    async fn request_access_uses_throwaway_credentials() {
        let (_temp, storage) = make_storage();
        let (_sessions, manager) = manager_over(&storage);
        manager.init().await;

        manager
            .request_access("pending@ebyte.edu", "Pat Chen")
            .await
            .unwrap();

        // The account exists but its password is random; nothing guessable
        // signs in.
        let account = AccountRepository::new(&storage)
            .find_by_email("pending@ebyte.edu")
            .unwrap();
        assert!(!account.password_digest.is_empty());
        manager.shutdown();
    }

    #[test]
    fn split_name_takes_first_token_and_remainder() {
        assert_eq!(split_name("Ada Lovelace"), ("Ada".into(), "Lovelace".into()));
        assert_eq!(
            split_name("Jean Luc Picard"),
            ("Jean".into(), "Luc Picard".into())
        );
        assert_eq!(split_name("Cher"), ("Cher".into(), "".into()));
        assert_eq!(split_name("  "), ("".into(), "".into()));
    }
}
