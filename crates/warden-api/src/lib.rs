//! # warden-api
//!
//! HTTP API layer for Warden built on Axum.
//!
//! Provides the auth endpoints (login, refresh, revoke, check-session), the
//! health endpoint, middleware (CORS, request logging, refresh rate
//! limiting), extractors, DTOs and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
