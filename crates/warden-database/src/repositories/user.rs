//! User repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::user::{CreateUser, User};

use crate::error::map_sqlx_error;

/// Columns of [`User`], with role names aggregated from `user_roles`.
const USER_SELECT: &str = "\
    SELECT u.id, u.email, u.password_hash, u.email_verified, u.is_active, u.is_deleted, \
           u.lockout_until, u.max_allowed_sessions, u.last_login_at, u.last_login_ip, \
           COALESCE(array_agg(r.name ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL), \
                    '{}'::text[]) AS roles, \
           u.created_at \
    FROM users u \
    LEFT JOIN user_roles ur ON ur.user_id = u.id \
    LEFT JOIN roles r ON r.id = ur.role_id";

/// SQL access to the `users` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Find a user by primary key.
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = $1 GROUP BY u.id"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Failed to find user by id", e))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(conn: &mut PgConnection, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "{USER_SELECT} WHERE LOWER(u.email) = LOWER($1) GROUP BY u.id"
        ))
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to find user by email", e))
    }

    /// Take a row lock on the user for the rest of the enclosing transaction.
    ///
    /// Returns `false` when the user does not exist.
    pub async fn lock_for_update(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Failed to lock user", e))?;
        Ok(locked.is_some())
    }

    /// Record a successful login or refresh. A `None` IP keeps the stored one.
    pub async fn update_last_login(
        conn: &mut PgConnection,
        id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET last_login_at = $2, last_login_ip = COALESCE($3, last_login_ip) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .bind(ip)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to update last login", e))?;
        Ok(())
    }

    /// List users ordered by email.
    pub async fn list(conn: &mut PgConnection, limit: i64) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "{USER_SELECT} GROUP BY u.id ORDER BY u.email LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to list users", e))
    }

    /// Insert a user and grant the named roles. Unknown role names are ignored.
    pub async fn create(conn: &mut PgConnection, data: &CreateUser) -> AppResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (id, email, password_hash, email_verified, max_allowed_sessions) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.email_verified)
        .bind(data.max_allowed_sessions)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to create user", e))?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) \
             SELECT $1, id FROM roles WHERE name = ANY($2)",
        )
        .bind(id)
        .bind(&data.roles)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Failed to assign roles", e))?;

        Ok(id)
    }

    /// Set or clear the lockout deadline. Returns `false` if no such user.
    pub async fn set_lockout(
        conn: &mut PgConnection,
        id: Uuid,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET lockout_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Failed to update lockout", e))?;
        Ok(result.rows_affected() > 0)
    }
}
