//! Warden Server: credential and session authority.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use warden_auth::{
    JwtTokenIssuer, MemorySessionStore, PasswordHasher, PostgresSessionStore, SessionManager,
    SessionStore,
};
use warden_core::config::AppConfig;
use warden_core::config::database::StoreBackend;
use warden_core::error::AppError;
use warden_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load and validate configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Warden");

    // ── Step 1: Session store ────────────────────────────────────
    let (store, db_pool): (Arc<dyn SessionStore>, Option<DatabasePool>) =
        match config.store.backend {
            StoreBackend::Postgres => {
                if !config.store.seed_users.is_empty() {
                    tracing::warn!("store.seed_users is ignored by the postgres backend");
                }
                tracing::info!("Connecting to database...");
                let pool = DatabasePool::connect(&config.database).await?;
                warden_database::migration::run_migrations(pool.pool()).await?;
                (Arc::new(PostgresSessionStore::new(pool.clone())), Some(pool))
            }
            StoreBackend::Memory => {
                let store = MemorySessionStore::new();
                let seeded = store
                    .seed_users(&config.store.seed_users, &PasswordHasher::new())
                    .await?;
                if seeded == 0 {
                    tracing::warn!(
                        "Using the in-memory session store with no users; declare \
                         [[store.seed_users]] to log in. State is lost on exit"
                    );
                } else {
                    tracing::warn!(
                        seeded,
                        "Using the in-memory session store; state is lost on exit"
                    );
                }
                (Arc::new(store), None)
            }
        };

    // ── Step 2: Auth system ──────────────────────────────────────
    let issuer = Arc::new(JwtTokenIssuer::new(&config.auth)?);
    let verifier = Arc::new(PasswordHasher::new());
    let session_manager =
        SessionManager::new(store, issuer, verifier, config.session.clone());

    // ── Step 3: HTTP server ──────────────────────────────────────
    let server = config.server.clone();
    let state = warden_api::AppState::new(config, session_manager);
    let app = warden_api::build_app(state, &server);

    warden_api::serve(app, &server).await?;

    // ── Step 4: Release connections ──────────────────────────────
    if let Some(pool) = db_pool {
        let grace = std::time::Duration::from_secs(server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, pool.close()).await.is_err() {
            tracing::warn!("Timed out closing database connections");
        }
    }

    tracing::info!("Warden shut down gracefully");
    Ok(())
}
