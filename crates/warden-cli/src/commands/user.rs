//! User management CLI commands.

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use warden_auth::PasswordHasher;
use warden_core::error::AppError;
use warden_database::DatabasePool;
use warden_database::repositories::user::UserRepository;
use warden_entity::user::CreateUser;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        /// Login email
        #[arg(long)]
        email: String,
        /// Concurrent session limit
        #[arg(long, default_value_t = 5)]
        max_sessions: i32,
        /// Role to grant; repeat for several
        #[arg(long = "role", default_value = "User")]
        roles: Vec<String>,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Mark the email as already confirmed
        #[arg(long)]
        verified: bool,
    },
    /// List users
    List {
        /// Maximum rows
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },
    /// Lock a user out of login and refresh
    Lock {
        /// Login email
        #[arg(long)]
        email: String,
        /// Lockout length in minutes
        #[arg(long, default_value_t = 30)]
        minutes: i64,
    },
    /// Clear a user's lockout
    Unlock {
        /// Login email
        #[arg(long)]
        email: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Email
    email: String,
    /// Roles
    roles: String,
    /// Status
    status: String,
    /// Session limit
    max_sessions: i32,
    /// Last login
    last_login: String,
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    pool: &DatabasePool,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        UserCommand::Create {
            email,
            max_sessions,
            roles,
            password,
            verified,
        } => {
            let password = match password {
                Some(p) => p.clone(),
                None => prompt_password()?,
            };
            if password.is_empty() {
                return Err(AppError::validation("Password must not be empty"));
            }

            let password_hash = PasswordHasher::new().hash_password(&password)?;
            let data = CreateUser {
                email: email.clone(),
                password_hash,
                email_verified: *verified,
                max_allowed_sessions: *max_sessions,
                roles: roles.clone(),
            };

            let mut conn = pool.acquire().await?;
            let id = UserRepository::create(&mut *conn, &data).await?;
            output::print_success(&format!("User '{email}' created"));
            output::print_kv("ID", &id.to_string());
            output::print_kv("Roles", &roles.join(","));
        }
        UserCommand::List { limit } => {
            let mut conn = pool.acquire().await?;
            let users = UserRepository::list(&mut *conn, *limit).await?;
            let now = Utc::now();

            let rows: Vec<UserRow> = users
                .iter()
                .map(|u| UserRow {
                    id: u.id.to_string(),
                    email: u.email.clone(),
                    roles: u.role_claim(),
                    status: u.status_at(now).to_string(),
                    max_sessions: u.max_allowed_sessions,
                    last_login: u
                        .last_login_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();

            output::print_list(&rows, format);
        }
        UserCommand::Lock { email, minutes } => {
            if *minutes <= 0 {
                return Err(AppError::validation("Lockout must be at least one minute"));
            }
            let user = super::require_user(pool, email).await?;
            let until = Utc::now() + Duration::minutes(*minutes);

            let mut conn = pool.acquire().await?;
            UserRepository::set_lockout(&mut *conn, user.id, Some(until)).await?;
            output::print_success(&format!(
                "User '{email}' locked until {}",
                until.format("%Y-%m-%d %H:%M UTC")
            ));
        }
        UserCommand::Unlock { email } => {
            let user = super::require_user(pool, email).await?;

            let mut conn = pool.acquire().await?;
            UserRepository::set_lockout(&mut *conn, user.id, None).await?;
            output::print_success(&format!("User '{email}' unlocked"));
        }
    }

    Ok(())
}

fn prompt_password() -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
