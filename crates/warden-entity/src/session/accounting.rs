//! Session accounting reported on login and refresh.

use serde::{Deserialize, Serialize};

/// How many sessions the user holds after an operation, and whether the
/// operation had to evict one to stay within the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAccounting {
    /// Non-revoked, unexpired sessions including the current one.
    pub active_sessions: usize,
    /// Whether at least one older session was revoked by this operation.
    pub oldest_session_revoked: bool,
    /// The limit that was enforced.
    pub max_allowed_sessions: usize,
}
