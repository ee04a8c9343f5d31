//! Derived account status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of the login-relevant account flags at a point in time.
///
/// Not stored: computed from `is_active`, `is_deleted` and `lockout_until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Account can log in.
    Active,
    /// Account is disabled.
    Inactive,
    /// Account is soft-deleted.
    Deleted,
    /// Account is temporarily locked out.
    Locked,
}

impl UserStatus {
    /// Check if the user can log in with this status.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Deleted => "deleted",
            Self::Locked => "locked",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
