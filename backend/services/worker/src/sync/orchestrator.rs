use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use ledgersync_common::error::LedgerResult;
use ledgersync_common::request::SyncRequest;
use ledgersync_db::sync::models::CoarseSyncStatus;
use ledgersync_db::sync::repositories::SyncStatusRepository;

use super::best_effort::best_effort;
use super::context::SyncContext;
use super::entity::SyncEntity;
use super::fetcher::ScopeFactory;
use super::outcome::SyncOutcomes;
use super::retry::{RetryExecutor, RetryPolicy};
use crate::queue::MessageHandler;

/// Summary of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub company_id: String,
    pub status: CoarseSyncStatus,
    pub outcomes: SyncOutcomes,
}

/// Drives one full sync per request: coarse status, every entity type in
/// order through the retry executor, then the terminal status.
pub struct SyncOrchestrator {
    scopes: Arc<dyn ScopeFactory>,
    status_repo: Arc<dyn SyncStatusRepository>,
    executor: RetryExecutor,
}

impl SyncOrchestrator {
    pub fn new(
        scopes: Arc<dyn ScopeFactory>,
        status_repo: Arc<dyn SyncStatusRepository>,
        policy: RetryPolicy,
    ) -> Self {
        let executor = RetryExecutor::new(policy, status_repo.clone());
        Self {
            scopes,
            status_repo,
            executor,
        }
    }

    /// Run a full sync for `request`.
    ///
    /// Invalid requests fail before anything is written. Any other error
    /// leaves the company marked Failed (best effort) and is returned as is.
    pub async fn run(&self, request: &SyncRequest) -> LedgerResult<SyncReport> {
        request.validate()?;
        let ctx = SyncContext::from_request(request);

        let span = tracing::info_span!(
            "full_sync",
            company_id = %ctx.company_id,
            requested_at = %ctx.requested_at,
        );

        async {
            match self.sync_all(&ctx).await {
                Ok(report) => Ok(report),
                Err(e) => {
                    tracing::error!(error = %e, "full sync aborted");
                    let detail = e.to_string();
                    best_effort(
                        "set coarse status Failed",
                        self.status_repo.set_coarse_status(
                            &ctx.company_id,
                            CoarseSyncStatus::Failed,
                            Some(&detail),
                        ),
                    )
                    .await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn sync_all(&self, ctx: &SyncContext) -> LedgerResult<SyncReport> {
        self.status_repo
            .set_coarse_status(&ctx.company_id, CoarseSyncStatus::Running, None)
            .await?;
        tracing::info!("full sync started");

        let fetcher = self.scopes.resolve(ctx).await?;
        let fetcher = fetcher.as_ref();

        let mut outcomes = SyncOutcomes::default();
        for entity in SyncEntity::ALL {
            self.executor
                .run_with_retry(entity, ctx, &mut outcomes, || {
                    fetcher.fetch_and_persist(ctx, entity)
                })
                .await;
        }

        let detail = outcomes.error_detail();
        let status = if detail.is_some() {
            CoarseSyncStatus::PartiallyFailed
        } else {
            CoarseSyncStatus::Completed
        };
        self.status_repo
            .set_coarse_status(&ctx.company_id, status, detail.as_deref())
            .await?;

        tracing::info!(
            status = status.as_str(),
            synced = outcomes.total_synced(),
            failed_entities = outcomes.errors().len(),
            "full sync finished"
        );

        Ok(SyncReport {
            company_id: ctx.company_id.clone(),
            status,
            outcomes,
        })
    }
}

#[async_trait]
impl MessageHandler for SyncOrchestrator {
    async fn handle(&self, body: &str) -> LedgerResult<()> {
        let request = SyncRequest::from_json(body)?;
        self.run(&request).await.map(|_| ())
    }
}
