//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod validated;

pub use auth::AuthUser;
pub use client::ClientInfo;
pub use validated::{ValidatedJson, ValidatedQuery};
