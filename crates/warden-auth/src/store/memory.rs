//! In-memory session store for development and tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use warden_core::config::database::SeedUser;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_entity::session::Session;
use warden_entity::user::User;

use super::{SessionStore, StoreTransaction};
use crate::password::PasswordHasher;

/// Everything the store holds.
#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
}

impl MemoryState {
    fn session_mut(&mut self, id: Uuid) -> AppResult<&mut Session> {
        self.sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Session {id} not found")))
    }

    fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::RestoreUser(user) => {
                self.users.insert(user.id, user);
            }
            Undo::RestoreSession(session) => {
                self.sessions.insert(session.id, session);
            }
            Undo::RemoveSession(id) => {
                self.sessions.remove(&id);
            }
        }
    }
}

/// The inverse of one write, replayed newest first on rollback.
#[derive(Debug)]
enum Undo {
    RestoreUser(User),
    RestoreSession(Session),
    RemoveSession(Uuid),
}

/// In-memory session store using a Tokio mutex for isolation.
///
/// Each transaction holds the mutex for its whole lifetime, so transactions
/// are trivially serialisable. Writes go straight to the guarded state; each
/// one records the prior value of the row it touched, and those records are
/// replayed on rollback or drop.
///
/// Suitable for single-process deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<Mutex<MemoryState>>,
    injected_failures: Arc<AtomicU32>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Add or replace a session directly, bypassing the engine.
    pub async fn insert_session(&self, session: Session) {
        self.state.lock().await.sessions.insert(session.id, session);
    }

    /// Fetch a user by id.
    pub async fn user(&self, user_id: Uuid) -> Option<User> {
        self.state.lock().await.users.get(&user_id).cloned()
    }

    /// Every session of a user, oldest first.
    pub async fn sessions_for_user(&self, user_id: Uuid) -> Vec<Session> {
        let state = self.state.lock().await;
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.created_at, s.id));
        sessions
    }

    /// Insert the configured seed users, hashing their passwords.
    ///
    /// Returns the number of users inserted.
    pub async fn seed_users(
        &self,
        seeds: &[SeedUser],
        hasher: &PasswordHasher,
    ) -> AppResult<usize> {
        let now = Utc::now();
        for seed in seeds {
            self.insert_user(User {
                id: Uuid::new_v4(),
                email: seed.email.trim().to_string(),
                password_hash: hasher.hash_password(&seed.password)?,
                email_verified: true,
                is_active: true,
                is_deleted: false,
                lockout_until: None,
                max_allowed_sessions: seed.max_sessions,
                last_login_at: None,
                last_login_ip: None,
                roles: seed.roles.clone(),
                created_at: now,
            })
            .await;
        }
        Ok(seeds.len())
    }

    /// Make the next `count` commits fail with a transient error, as a
    /// serialization conflict would.
    pub fn inject_transient_failures(&self, count: u32) {
        self.injected_failures.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            undo_log: Vec::new(),
            committed: false,
            injected_failures: Arc::clone(&self.injected_failures),
        }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// A transaction over the in-memory state.
struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    undo_log: Vec<Undo>,
    committed: bool,
    injected_failures: Arc<AtomicU32>,
}

impl MemoryTransaction {
    fn take_injected_failure(&self) -> bool {
        self.injected_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn session_for_write(&mut self, session_id: Uuid) -> AppResult<&mut Session> {
        let prior = self.guard.session_mut(session_id)?.clone();
        self.undo_log.push(Undo::RestoreSession(prior));
        self.guard.session_mut(session_id)
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if self.committed || self.undo_log.is_empty() {
            return;
        }
        let writes = self.undo_log.len();
        while let Some(undo) = self.undo_log.pop() {
            self.guard.undo(undo);
        }
        debug!(writes, "Rolled back in-memory transaction");
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.guard.users.contains_key(&user_id))
    }

    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .guard
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&mut self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.guard.users.get(&user_id).cloned())
    }

    async fn update_last_login(
        &mut self,
        user_id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AppResult<()> {
        let user = self
            .guard
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        self.undo_log.push(Undo::RestoreUser(user.clone()));
        user.last_login_at = Some(at);
        if let Some(ip) = ip {
            user.last_login_ip = Some(ip.to_string());
        }
        Ok(())
    }

    async fn find_session_by_refresh_token(&mut self, token: &str) -> AppResult<Option<Session>> {
        Ok(self
            .guard
            .sessions
            .values()
            .find(|s| s.refresh_token == token)
            .cloned())
    }

    async fn find_active_sessions(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        let mut active: Vec<Session> = self
            .guard
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active_at(now))
            .cloned()
            .collect();
        active.sort_by_key(|s| (s.created_at, s.id));
        Ok(active)
    }

    async fn find_latest_session_for_device(
        &mut self,
        user_id: Uuid,
        device_id: &str,
    ) -> AppResult<Option<Session>> {
        Ok(self
            .guard
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.device_id == device_id)
            .max_by_key(|s| (s.created_at, s.id))
            .cloned())
    }

    async fn insert_session(&mut self, session: &Session) -> AppResult<()> {
        if self
            .guard
            .sessions
            .values()
            .any(|s| s.refresh_token == session.refresh_token)
        {
            return Err(AppError::conflict("Refresh token already exists"));
        }
        let undo = match self.guard.sessions.insert(session.id, session.clone()) {
            Some(replaced) => Undo::RestoreSession(replaced),
            None => Undo::RemoveSession(session.id),
        };
        self.undo_log.push(undo);
        Ok(())
    }

    async fn revoke_session(&mut self, session_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.session_for_write(session_id)?.revoke(at);
        Ok(())
    }

    async fn touch_session(&mut self, session_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.session_for_write(session_id)?.last_activity = at;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut tx = self;
        if tx.take_injected_failure() {
            return Err(AppError::transient("could not serialize access (injected)"));
        }
        tx.committed = true;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
