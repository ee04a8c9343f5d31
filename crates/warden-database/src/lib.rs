//! # warden-database
//!
//! PostgreSQL connection management, the migration runner and the SQL
//! repositories behind the PostgreSQL session store. Repository functions
//! take a `&mut PgConnection` so callers decide whether they run inside a
//! transaction.

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use error::map_sqlx_error;
