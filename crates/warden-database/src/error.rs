//! Classification of sqlx errors into application error kinds.

use warden_core::error::{AppError, ErrorKind};

/// PostgreSQL `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";
/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error to an [`AppError`], marking conflicts that a retry from
/// a fresh transaction can resolve as [`ErrorKind::TransientStore`].
pub fn map_sqlx_error(context: &str, err: sqlx::Error) -> AppError {
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());

    let kind = match code.as_deref() {
        Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => ErrorKind::TransientStore,
        Some(UNIQUE_VIOLATION) => ErrorKind::Conflict,
        _ => match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::Database,
        },
    };

    AppError::with_source(kind, format!("{context}: {err}"), err)
}
