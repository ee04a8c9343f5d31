//! CLI command definitions and dispatch.

pub mod migrate;
pub mod session;
pub mod user;

use clap::{Parser, Subcommand};

use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_database::DatabasePool;
use warden_entity::user::User;

use crate::output::OutputFormat;

/// Warden: credential and session authority
#[derive(Debug, Parser)]
#[command(name = "warden", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment; reads `config/{env}.toml` over `config/default.toml`
    #[arg(short, long, env = "WARDEN_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run pending database migrations
    Migrate,
    /// User management
    User(user::UserArgs),
    /// Session management
    Session(session::SessionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        let pool = DatabasePool::connect(&config.database).await?;

        let result = match &self.command {
            Commands::Migrate => migrate::execute(&pool).await,
            Commands::User(args) => user::execute(args, &pool, self.format).await,
            Commands::Session(args) => session::execute(args, &pool, self.format).await,
        };

        pool.close().await;
        result
    }
}

/// Helper: look a user up by email or fail with `NotFound`
pub async fn require_user(pool: &DatabasePool, email: &str) -> Result<User, AppError> {
    let mut conn = pool.acquire().await?;
    warden_database::repositories::user::UserRepository::find_by_email(&mut *conn, email)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))
}
