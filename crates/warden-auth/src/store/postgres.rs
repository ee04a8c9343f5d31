//! PostgreSQL-backed session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_database::DatabasePool;
use warden_database::error::map_sqlx_error;
use warden_database::repositories::{SessionRepository, UserRepository};
use warden_entity::session::Session;
use warden_entity::user::User;

use super::{SessionStore, StoreTransaction};

/// Session store over PostgreSQL.
///
/// Transactions run at `SERIALIZABLE` and `lock_user` takes a row lock, so
/// concurrent logins and refreshes of one user are serialised. Conflicts the
/// database detects surface as transient errors for the coordinator to retry.
#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    db: DatabasePool,
}

impl PostgresSessionStore {
    /// Create a store over an open pool.
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let tx = self.db.begin_serializable().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.health_check().await
    }
}

/// An open serializable transaction. Dropped uncommitted, sqlx rolls it back.
struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<bool> {
        UserRepository::lock_for_update(&mut *self.tx, user_id).await
    }

    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        UserRepository::find_by_email(&mut *self.tx, email).await
    }

    async fn find_user_by_id(&mut self, user_id: Uuid) -> AppResult<Option<User>> {
        UserRepository::find_by_id(&mut *self.tx, user_id).await
    }

    async fn update_last_login(
        &mut self,
        user_id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AppResult<()> {
        UserRepository::update_last_login(&mut *self.tx, user_id, at, ip).await
    }

    async fn find_session_by_refresh_token(&mut self, token: &str) -> AppResult<Option<Session>> {
        SessionRepository::find_by_refresh_token(&mut *self.tx, token).await
    }

    async fn find_active_sessions(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        SessionRepository::find_active_by_user(&mut *self.tx, user_id, now).await
    }

    async fn find_latest_session_for_device(
        &mut self,
        user_id: Uuid,
        device_id: &str,
    ) -> AppResult<Option<Session>> {
        SessionRepository::find_latest_for_device(&mut *self.tx, user_id, device_id).await
    }

    async fn insert_session(&mut self, session: &Session) -> AppResult<()> {
        SessionRepository::insert(&mut *self.tx, session).await
    }

    async fn revoke_session(&mut self, session_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        SessionRepository::revoke(&mut *self.tx, session_id, at).await
    }

    async fn touch_session(&mut self, session_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        SessionRepository::touch(&mut *self.tx, session_id, at).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("Failed to roll back transaction", e))
    }
}
