//! The session lifecycle engine.

pub mod eviction;
pub mod manager;
pub mod outcome;
mod work;

pub use manager::{LoginRequest, SessionManager};
pub use outcome::{CheckOutcome, LoginOutcome, RefreshOutcome, RevokeOutcome, TokenResponse};
