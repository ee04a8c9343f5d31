//! The session store: the single source of truth for users' sessions.
//!
//! Every engine operation runs inside one [`StoreTransaction`]. A transaction
//! sees a consistent view of one user's sessions and either commits all of
//! its writes or none. Dropping a transaction without committing rolls it
//! back, so a cancelled request leaves no partial state behind.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::session::Session;
use warden_entity::user::User;

pub use memory::MemorySessionStore;
pub use postgres::PostgresSessionStore;

/// Opens transactions against a session store backend.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Begin a new transaction.
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> AppResult<()>;
}

/// Reads and writes available inside one store transaction.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Serialise with every other transaction that locks the same user.
    /// Returns `false` if the user does not exist.
    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<bool>;

    /// Look up a user by email, case-insensitively.
    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>>;

    /// Look up a user by id.
    async fn find_user_by_id(&mut self, user_id: Uuid) -> AppResult<Option<User>>;

    /// Record a login or refresh. `None` keeps the previous IP.
    async fn update_last_login(
        &mut self,
        user_id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AppResult<()>;

    /// Look up a session by refresh token regardless of its state.
    async fn find_session_by_refresh_token(&mut self, token: &str) -> AppResult<Option<Session>>;

    /// Non-revoked sessions unexpired at `now`, ordered by `created_at` ascending.
    async fn find_active_sessions(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>>;

    /// The most recently created session for a user's device, in any state.
    async fn find_latest_session_for_device(
        &mut self,
        user_id: Uuid,
        device_id: &str,
    ) -> AppResult<Option<Session>>;

    /// Persist a new session.
    async fn insert_session(&mut self, session: &Session) -> AppResult<()>;

    /// Mark a session revoked. Re-revoking keeps the first `revoked_on`.
    async fn revoke_session(&mut self, session_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Set `last_activity`.
    async fn touch_session(&mut self, session_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Make every write of this transaction visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every write of this transaction.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
