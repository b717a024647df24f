// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session store adapter.
//!
//! The session store owns credentials and live sessions. The rest of the
//! service treats it as a black box: sessions are opaque tokens tied to a
//! subject id and an expiry, and state changes arrive as broadcast events.
//! `LocalSessionStore` is the concrete implementation backing self-hosted
//! deployments; it keeps credential digests in the data store and live
//! tokens in memory, so all sessions die with the process.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng, RngCore};
use sha2::Sha256;
use tokio::sync::broadcast;

use crate::auth::{AccountStatus, Role};
use crate::storage::{
    AccountRepository, DataStore, ProfileRepository, StorageError, StoredAccount, StoredProfile,
};

type HmacSha256 = Hmac<Sha256>;

/// Capacity of the session-change broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// A live authenticated session.
///
/// The token is opaque to every consumer; only the session store can map
/// it back to a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Subject id the session was issued for.
    pub subject_id: String,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is still valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Kinds of session state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    TokenRefreshed,
    SignedOut,
}

/// A session state change notification.
#[derive(Debug, Clone)]
pub struct SessionChange {
    pub event: SessionEvent,
    /// The session after the change (`None` after sign-out).
    pub session: Option<Session>,
}

/// Metadata captured at registration time.
#[derive(Debug, Clone, Default)]
pub struct SignUpMetadata {
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    pub institute_name: Option<String>,
    pub added_by: Option<String>,
}

/// Errors surfaced by the session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with email {0} already exists")]
    EmailTaken(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Interface to the external session/identity store.
///
/// Subscribers get change events in delivery order; dropping the receiver
/// unsubscribes.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The current session, if one exists and has not expired.
    async fn get_session(&self) -> Option<Session>;

    /// Authenticate credentials and issue a session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionStoreError>;

    /// End the current session. Safe to call without one.
    async fn sign_out(&self) -> Result<(), SessionStoreError>;

    /// Register a new account; returns the new subject id.
    ///
    /// Registration does not sign the account in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<String, SessionStoreError>;

    /// Resolve a bearer token to its session, if valid.
    async fn session_for_token(&self, token: &str) -> Option<Session>;

    /// Revoke a single token. Idempotent.
    async fn revoke(&self, token: &str) -> Result<(), SessionStoreError>;

    /// Subscribe to session change events.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}

#[derive(Default)]
struct SessionMap {
    /// The most recently signed-in session (the "current" one).
    current: Option<Session>,
    /// All live tokens, current or not.
    tokens: HashMap<String, Session>,
}

/// Session store backed by the local data store.
pub struct LocalSessionStore {
    storage: DataStore,
    session_ttl: Duration,
    sessions: RwLock<SessionMap>,
    events: broadcast::Sender<SessionChange>,
}

impl LocalSessionStore {
    /// Create a new store over the given data store.
    pub fn new(storage: DataStore, session_ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            session_ttl,
            sessions: RwLock::new(SessionMap::default()),
            events,
        }
    }

    fn issue_session(&self, subject_id: &str) -> Session {
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            expires_at: Utc::now() + self.session_ttl,
        };

        let mut map = self.sessions.write().expect("session map poisoned");
        map.tokens.insert(session.token.clone(), session.clone());
        map.current = Some(session.clone());
        session
    }

    fn emit(&self, event: SessionEvent, session: Option<Session>) {
        // No receivers is fine; the event is simply dropped.
        let _ = self.events.send(SessionChange { event, session });
    }
}

#[async_trait]
impl SessionStore for LocalSessionStore {
    async fn get_session(&self) -> Option<Session> {
        let map = self.sessions.read().expect("session map poisoned");
        map.current
            .clone()
            .filter(|s| s.is_valid_at(Utc::now()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionStoreError> {
        let accounts = AccountRepository::new(&self.storage);
        let account = accounts
            .find_by_email(email)
            .map_err(|_| SessionStoreError::InvalidCredentials)?;

        if !verify_password(&account, password) {
            return Err(SessionStoreError::InvalidCredentials);
        }

        let session = self.issue_session(&account.subject_id);
        self.emit(SessionEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), SessionStoreError> {
        let previous = {
            let mut map = self.sessions.write().expect("session map poisoned");
            let previous = map.current.take();
            if let Some(session) = &previous {
                map.tokens.remove(&session.token);
            }
            previous
        };

        if previous.is_some() {
            self.emit(SessionEvent::SignedOut, None);
        }
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<String, SessionStoreError> {
        let accounts = AccountRepository::new(&self.storage);
        if accounts.find_by_email(email).is_ok() {
            return Err(SessionStoreError::EmailTaken(email.to_string()));
        }

        let subject_id = uuid::Uuid::new_v4().to_string();
        let salt = generate_salt();
        let account = StoredAccount {
            subject_id: subject_id.clone(),
            email: email.to_string(),
            password_digest: digest_password(&salt, password),
            salt: Base64::encode_string(&salt),
            created_at: Utc::now(),
        };
        accounts.create(&account)?;

        // The profile row is inserted keyed by the new subject id, the same
        // way a hosted identity store materializes signup metadata.
        let profiles = ProfileRepository::new(&self.storage);
        profiles.create(&StoredProfile {
            id: subject_id.clone(),
            email: email.to_string(),
            first_name: metadata.first_name,
            last_name: metadata.last_name,
            role: metadata.role.unwrap_or_default(),
            status: metadata.status.unwrap_or_default(),
            institute_name: metadata.institute_name,
            added_by: metadata.added_by,
            created_at: Utc::now(),
        })?;

        Ok(subject_id)
    }

    async fn session_for_token(&self, token: &str) -> Option<Session> {
        let map = self.sessions.read().expect("session map poisoned");
        map.tokens
            .get(token)
            .cloned()
            .filter(|s| s.is_valid_at(Utc::now()))
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionStoreError> {
        let was_current = {
            let mut map = self.sessions.write().expect("session map poisoned");
            map.tokens.remove(token);
            if map.current.as_ref().map(|s| s.token.as_str()) == Some(token) {
                map.current = None;
                true
            } else {
                false
            }
        };

        if was_current {
            self.emit(SessionEvent::SignedOut, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }
}

fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

fn digest_password(salt: &[u8], password: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(salt).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    Base64::encode_string(mac.finalize().into_bytes().as_slice())
}

fn verify_password(account: &StoredAccount, password: &str) -> bool {
    let Ok(salt) = Base64::decode_vec(&account.salt) else {
        return false;
    };
    digest_password(&salt, password) == account.password_digest
}

/// Generate a random throwaway password for accounts that are not expected
/// to be used until validated.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LocalSessionStore) {
        let temp = TempDir::new().unwrap();
        let mut storage = DataStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, LocalSessionStore::new(storage, Duration::minutes(30)))
    }

    async fn register(store: &LocalSessionStore, email: &str, password: &str) -> String {
        store
            .sign_up(
                email,
                password,
                SignUpMetadata {
                    first_name: "Test".to_string(),
                    last_name: "User".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let (_temp, store) = setup();
        let subject_id = register(&store, "s@ebyte.edu", "password").await;

        let session = store
            .sign_in_with_password("s@ebyte.edu", "password")
            .await
            .unwrap();
        assert_eq!(session.subject_id, subject_id);

        let current = store.get_session().await.unwrap();
        assert_eq!(current.token, session.token);
    }

    #[tokio::test]
    async fn sign_up_creates_pending_profile() {
        let (_temp, store) = setup();
        let subject_id = register(&store, "new@ebyte.edu", "pw").await;

        let profiles = ProfileRepository::new(&store.storage);
        let profile = profiles.get(&subject_id).unwrap();
        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.status, AccountStatus::Pending);
        assert_eq!(profile.email, "new@ebyte.edu");
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (_temp, store) = setup();
        register(&store, "s@ebyte.edu", "password").await;

        let result = store.sign_in_with_password("s@ebyte.edu", "wrong").await;
        assert!(matches!(result, Err(SessionStoreError::InvalidCredentials)));
        assert!(store.get_session().await.is_none());
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let (_temp, store) = setup();
        let result = store.sign_in_with_password("nobody@ebyte.edu", "pw").await;
        assert!(matches!(result, Err(SessionStoreError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let (_temp, store) = setup();
        register(&store, "dup@ebyte.edu", "pw").await;

        let result = store
            .sign_up("dup@ebyte.edu", "pw2", SignUpMetadata::default())
            .await;
        assert!(matches!(result, Err(SessionStoreError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn sign_out_clears_current_session_and_emits() {
        let (_temp, store) = setup();
        register(&store, "s@ebyte.edu", "password").await;

        let mut events = store.subscribe();
        store
            .sign_in_with_password("s@ebyte.edu", "password")
            .await
            .unwrap();
        store.sign_out().await.unwrap();

        assert!(store.get_session().await.is_none());

        let first = events.recv().await.unwrap();
        assert_eq!(first.event, SessionEvent::SignedIn);
        let second = events.recv().await.unwrap();
        assert_eq!(second.event, SessionEvent::SignedOut);
        assert!(second.session.is_none());

        // Second sign-out is a no-op, not an error.
        store.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn token_resolution_and_revoke() {
        let (_temp, store) = setup();
        register(&store, "s@ebyte.edu", "password").await;

        let session = store
            .sign_in_with_password("s@ebyte.edu", "password")
            .await
            .unwrap();

        let resolved = store.session_for_token(&session.token).await.unwrap();
        assert_eq!(resolved.subject_id, session.subject_id);

        store.revoke(&session.token).await.unwrap();
        assert!(store.session_for_token(&session.token).await.is_none());
        assert!(store.get_session().await.is_none());

        // Revoking again is fine.
        store.revoke(&session.token).await.unwrap();
    }

    #[tokio::test]
    async fn expired_sessions_are_not_returned() {
        let temp = TempDir::new().unwrap();
        let mut storage = DataStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let store = LocalSessionStore::new(storage, Duration::minutes(-1));

        register(&store, "s@ebyte.edu", "password").await;
        let session = store
            .sign_in_with_password("s@ebyte.edu", "password")
            .await
            .unwrap();

        assert!(store.get_session().await.is_none());
        assert!(store.session_for_token(&session.token).await.is_none());
    }

    #[test]
    fn generated_passwords_are_random() {
        let a = generate_password();
        let b = generate_password();
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
    }
}
