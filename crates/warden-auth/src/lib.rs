//! # warden-auth
//!
//! The session and token lifecycle of Warden.
//!
//! ## Modules
//!
//! - `store` — session store interface with PostgreSQL and in-memory backends
//! - `jwt` — access token signing/validation and refresh token generation
//! - `password` — credential verification (Argon2id by default)
//! - `transaction` — unit-of-work runner with retry on transient store failures
//! - `session` — the lifecycle engine: login, refresh, revoke, check-session

pub mod error;
pub mod jwt;
pub mod password;
pub mod session;
pub mod store;
pub mod transaction;

pub use error::AuthError;
pub use jwt::{Claims, JwtTokenIssuer, TokenIssuer, TokenValidation};
pub use password::{CredentialVerifier, PasswordHasher};
pub use session::{
    CheckOutcome, LoginOutcome, LoginRequest, RefreshOutcome, RevokeOutcome, SessionManager,
    TokenResponse,
};
pub use store::{MemorySessionStore, PostgresSessionStore, SessionStore, StoreTransaction};
pub use transaction::{RetryPolicy, TransactionCoordinator, UnitOfWork};
