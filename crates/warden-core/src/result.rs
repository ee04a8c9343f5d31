//! Convenience result type alias for Warden.

use crate::error::AppError;

/// A specialized `Result` type for Warden operations.
///
/// Every crate uses this alias instead of spelling out
/// `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
