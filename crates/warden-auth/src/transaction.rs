//! Transaction coordinator: one store transaction per unit of work, retried
//! from scratch on transient store failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use warden_core::config::session::RetryConfig;

use crate::error::AuthError;
use crate::store::{SessionStore, StoreTransaction};

/// A unit of work executed inside a single store transaction.
///
/// `execute` may run more than once. It must derive everything it writes
/// from what it reads in the transaction it is given, so that a retry from
/// a fresh transaction is safe.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// What a successful run yields.
    type Output: Send;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Run against an open transaction. `Err` rolls it back.
    async fn execute(&self, tx: &mut dyn StoreTransaction) -> Result<Self::Output, AuthError>;
}

/// Exponential backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap for any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy from configuration. At least one attempt is always made.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Runs units of work against a session store.
#[derive(Clone)]
pub struct TransactionCoordinator {
    store: Arc<dyn SessionStore>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for TransactionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCoordinator")
            .field("policy", &self.policy)
            .finish()
    }
}

impl TransactionCoordinator {
    /// Creates a coordinator over `store`.
    pub fn new(store: Arc<dyn SessionStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Run `work` to completion.
    ///
    /// Commits on `Ok`, rolls back on `Err`. A transient fault, whether from
    /// the unit or from commit, restarts the unit in a new transaction until
    /// the policy's attempts are used up. Business rejections return at once.
    pub async fn run<W: UnitOfWork>(&self, work: &W) -> Result<W::Output, AuthError> {
        let mut attempt = 1;
        loop {
            match self.run_once(work).await {
                Err(AuthError::Fault(e)) if e.is_transient() => {
                    if attempt >= self.policy.max_attempts {
                        error!(
                            unit = work.name(),
                            attempt,
                            error = %e,
                            "Transient store failure, retries exhausted"
                        );
                        return Err(AuthError::Fault(e));
                    }
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        unit = work.name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient store failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn run_once<W: UnitOfWork>(&self, work: &W) -> Result<W::Output, AuthError> {
        let mut tx = self.store.begin().await?;
        match work.execute(tx.as_mut()).await {
            Ok(output) => {
                tx.commit().await?;
                Ok(output)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(unit = work.name(), error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}
