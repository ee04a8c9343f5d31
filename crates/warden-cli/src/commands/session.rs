//! Session management CLI commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use warden_core::error::AppError;
use warden_database::DatabasePool;
use warden_database::repositories::session::SessionRepository;
use warden_entity::session::Session;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List a user's sessions
    List {
        /// Login email
        #[arg(long)]
        email: String,
        /// Include revoked and expired sessions
        #[arg(long)]
        all: bool,
    },
    /// Revoke every active session of a user
    RevokeAll {
        /// Login email
        #[arg(long)]
        email: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Session display row
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Session ID
    id: String,
    /// Device
    device: String,
    /// IP Address
    ip: String,
    /// State
    state: String,
    /// Created
    created: String,
    /// Last Activity
    last_activity: String,
    /// Expires
    expires: String,
}

impl SessionRow {
    fn from_session(s: &Session, now: chrono::DateTime<Utc>) -> Self {
        let state = if s.is_revoked {
            "revoked"
        } else if s.is_expired_at(now) {
            "expired"
        } else {
            "active"
        };
        Self {
            id: s.id.to_string(),
            device: format!("{} ({})", s.device_name, s.device_id),
            ip: s.ip_address.clone().unwrap_or_else(|| "-".to_string()),
            state: state.to_string(),
            created: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_activity: s.last_activity.format("%Y-%m-%d %H:%M").to_string(),
            expires: s.expires_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    pool: &DatabasePool,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        SessionCommand::List { email, all } => {
            let user = super::require_user(pool, email).await?;
            let now = Utc::now();

            let mut conn = pool.acquire().await?;
            let sessions = if *all {
                SessionRepository::find_by_user(&mut *conn, user.id).await?
            } else {
                SessionRepository::find_active_by_user(&mut *conn, user.id, now).await?
            };

            let rows: Vec<SessionRow> = sessions
                .iter()
                .map(|s| SessionRow::from_session(s, now))
                .collect();
            output::print_list(&rows, format);
        }
        SessionCommand::RevokeAll { email, force } => {
            let user = super::require_user(pool, email).await?;

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Revoke ALL sessions of '{email}'?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let mut conn = pool.acquire().await?;
            let count = SessionRepository::revoke_all_for_user(&mut *conn, user.id, Utc::now()).await?;
            tracing::info!(user_id = %user.id, count, "Sessions revoked from CLI");
            output::print_success(&format!("Revoked {count} sessions of '{email}'"));
        }
    }

    Ok(())
}
