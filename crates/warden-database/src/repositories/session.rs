//! Session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::session::Session;

use crate::error::map_sqlx_error;

const SESSION_COLUMNS: &str = "id, user_id, refresh_token, device_id, device_name, ip_address, \
     user_agent, created_at, last_activity, expires_at, is_revoked, revoked_on";

/// SQL access to the `user_sessions` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionRepository;

impl SessionRepository {
    /// Find a session by its refresh token, whatever its state.
    pub async fn find_by_refresh_token(
        conn: &mut PgConnection,
        refresh_token: &str,
    ) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE refresh_token = $1"
        ))
        .bind(refresh_token)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to find session by refresh token", e))
    }

    /// Non-revoked sessions of a user that are unexpired at `now`, oldest first.
    pub async fn find_active_by_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions \
             WHERE user_id = $1 AND NOT is_revoked AND expires_at > $2 \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to find active sessions", e))
    }

    /// Every session of a user, newest first.
    pub async fn find_by_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE user_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to list sessions", e))
    }

    /// The most recently created session for a user's device.
    pub async fn find_latest_for_device(
        conn: &mut PgConnection,
        user_id: Uuid,
        device_id: &str,
    ) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions \
             WHERE user_id = $1 AND device_id = $2 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(device_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to find device session", e))
    }

    /// Insert a new session row.
    pub async fn insert(conn: &mut PgConnection, session: &Session) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO user_sessions ({SESSION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.refresh_token)
        .bind(&session.device_id)
        .bind(&session.device_name)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity)
        .bind(session.expires_at)
        .bind(session.is_revoked)
        .bind(session.revoked_on)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to create session", e))?;
        Ok(())
    }

    /// Revoke a session. An earlier `revoked_on` is preserved.
    pub async fn revoke(conn: &mut PgConnection, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE user_sessions SET is_revoked = TRUE, revoked_on = COALESCE(revoked_on, $2) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to revoke session", e))?;
        Ok(())
    }

    /// Revoke every non-revoked session of a user. Returns how many changed.
    pub async fn revoke_all_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = TRUE, revoked_on = $2 \
             WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id)
        .bind(at)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to revoke sessions", e))?;
        Ok(result.rows_affected())
    }

    /// Update `last_activity`.
    pub async fn touch(conn: &mut PgConnection, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE user_sessions SET last_activity = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Failed to update session activity", e))?;
        Ok(())
    }
}
