//! Issued token value type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A freshly minted access or refresh token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The raw token string.
    pub token: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}
