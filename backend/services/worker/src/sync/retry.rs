use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ledgersync_common::error::LedgerResult;
use ledgersync_config::SyncConfig;
use ledgersync_db::sync::models::EntitySyncStatus;
use ledgersync_db::sync::repositories::SyncStatusRepository;

use super::best_effort::best_effort;
use super::context::SyncContext;
use super::entity::SyncEntity;
use super::outcome::{SyncOutcome, SyncOutcomes};

/// Fixed-delay retry budget for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retry_count: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry_count: 2,
            delay: Duration::from_secs(2),
        }
    }
}

impl From<&SyncConfig> for RetryPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self {
            max_retry_count: config.max_retry_count,
            delay: config.retry_delay(),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retry_count.saturating_add(1)
    }
}

/// Runs one entity's fetch-and-persist with retries and keeps its
/// entity-state row up to date.
///
/// Never returns an error: exhausting the budget is reported as
/// [`SyncOutcome::Failed`] so the remaining entity types still run.
pub struct RetryExecutor {
    policy: RetryPolicy,
    status_repo: Arc<dyn SyncStatusRepository>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, status_repo: Arc<dyn SyncStatusRepository>) -> Self {
        Self {
            policy,
            status_repo,
        }
    }

    pub async fn run_with_retry<F, Fut>(
        &self,
        entity: SyncEntity,
        ctx: &SyncContext,
        outcomes: &mut SyncOutcomes,
        mut fetch: F,
    ) -> SyncOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<u64>>,
    {
        let entity_name = entity.display_name();
        let max_attempts = self.policy.max_attempts();

        self.mark_entity(ctx, entity, EntitySyncStatus::Running).await;

        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.delay).await;
            }

            match fetch().await {
                Ok(count) => {
                    tracing::info!(entity = entity_name, attempt, count, "entity synced");
                    let outcome = SyncOutcome::Synced { entity_name, count };
                    outcomes.record(&outcome);
                    self.mark_entity(ctx, entity, EntitySyncStatus::Completed).await;
                    return outcome;
                }
                Err(e) => {
                    tracing::warn!(
                        entity = entity_name,
                        attempt,
                        max_attempts,
                        error = %e,
                        "entity sync attempt failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        tracing::error!(
            entity = entity_name,
            attempts = max_attempts,
            error = %last_error,
            "entity sync failed after all attempts"
        );
        self.mark_entity(ctx, entity, EntitySyncStatus::Failed).await;

        let outcome = SyncOutcome::Failed {
            entity_name,
            error_message: last_error,
        };
        outcomes.record(&outcome);
        outcome
    }

    async fn mark_entity(&self, ctx: &SyncContext, entity: SyncEntity, status: EntitySyncStatus) {
        let Some(user_id) = ctx.user_id else {
            return;
        };
        best_effort(
            "set entity state",
            self.status_repo
                .set_entity_state(user_id, &ctx.company_id, entity.state_key(), status),
        )
        .await;
    }
}
