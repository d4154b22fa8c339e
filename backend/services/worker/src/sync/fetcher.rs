use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use ledgersync_common::error::{LedgerError, LedgerResult};
use ledgersync_db::accounting::pg_repository::PgAccountingRepository;
use ledgersync_db::accounting::repositories::AccountingRepository;
use ledgersync_db::connection::repositories::ConnectionRepository;
use ledgersync_db::sync::models::SyncCheckpoint;
use ledgersync_db::sync::pg_repository::PgSyncStatusRepository;
use ledgersync_db::sync::repositories::SyncStatusRepository;

use super::best_effort::best_effort;
use super::context::SyncContext;
use super::entity::SyncEntity;
use crate::quickbooks::client::{QboClient, QboClientConfig};
use crate::quickbooks::mapping;

/// Fetch one entity type from upstream and upsert it locally.
///
/// Implementations must be safe to call again after a failure: a retry may
/// re-upsert records that were already written, never duplicate them.
#[async_trait]
pub trait EntityFetcher: Send + Sync {
    /// Returns the number of records synced. No partial count on error.
    async fn fetch_and_persist(&self, ctx: &SyncContext, entity: SyncEntity) -> LedgerResult<u64>;
}

/// Builds the per-run set of collaborators. Every call returns a fresh scope.
#[async_trait]
pub trait ScopeFactory: Send + Sync {
    async fn resolve(&self, ctx: &SyncContext) -> LedgerResult<Box<dyn EntityFetcher>>;
}

pub struct QuickBooksFetcher<A, S> {
    client: QboClient,
    accounting: A,
    status_repo: S,
    incremental: bool,
}

impl<A, S> QuickBooksFetcher<A, S>
where
    A: AccountingRepository,
    S: SyncStatusRepository,
{
    pub fn new(client: QboClient, accounting: A, status_repo: S, incremental: bool) -> Self {
        Self {
            client,
            accounting,
            status_repo,
            incremental,
        }
    }

    /// Checkpoint from the previous successful pull, when incremental sync
    /// is on and the run has a numeric user.
    async fn updated_after(&self, ctx: &SyncContext, entity: SyncEntity) -> Option<DateTime<Utc>> {
        if !self.incremental {
            return None;
        }
        let user_id = ctx.user_id?;
        best_effort(
            "read entity checkpoint",
            self.status_repo
                .get_entity_state(user_id, &ctx.company_id, entity.state_key()),
        )
        .await
        .flatten()
        .and_then(|state| state.last_updated_after)
    }

    async fn persist(&self, company_id: &str, entity: SyncEntity, raw: &Value) -> LedgerResult<()> {
        match entity {
            SyncEntity::Customers => {
                let row = mapping::customer_row(company_id, raw)?;
                self.accounting.upsert_customer(&row).await
            }
            SyncEntity::Vendors => {
                let row = mapping::vendor_row(company_id, raw)?;
                self.accounting.upsert_vendor(&row).await
            }
            SyncEntity::Products => {
                let row = mapping::product_row(company_id, raw)?;
                self.accounting.upsert_product(&row).await
            }
            SyncEntity::ChartOfAccounts => {
                let row = mapping::account_row(company_id, raw)?;
                self.accounting.upsert_account(&row).await
            }
            SyncEntity::Invoices => {
                let row = mapping::invoice_row(company_id, raw)?;
                self.accounting.upsert_invoice(&row).await
            }
            SyncEntity::Bills => {
                let row = mapping::bill_row(company_id, raw)?;
                self.accounting.upsert_bill(&row).await
            }
            SyncEntity::JournalEntries => {
                let row = mapping::journal_entry_row(company_id, raw)?;
                self.accounting.upsert_journal_entry(&row).await
            }
        }
    }
}

#[async_trait]
impl<A, S> EntityFetcher for QuickBooksFetcher<A, S>
where
    A: AccountingRepository,
    S: SyncStatusRepository,
{
    async fn fetch_and_persist(&self, ctx: &SyncContext, entity: SyncEntity) -> LedgerResult<u64> {
        let pull_started = Utc::now();
        let updated_after = self.updated_after(ctx, entity).await;

        let fetched = self
            .client
            .query_all(entity.qbo_entity(), updated_after)
            .await?;

        tracing::info!(
            entity = entity.display_name(),
            realm_id = self.client.realm_id(),
            fetched = fetched.records.len(),
            incremental = updated_after.is_some(),
            "fetched qbo records"
        );

        for raw in &fetched.records {
            self.persist(&ctx.company_id, entity, raw).await?;
        }

        if self.incremental {
            if let Some(user_id) = ctx.user_id {
                let checkpoint = SyncCheckpoint {
                    last_updated_after: Some(pull_started),
                    last_start_position: i32::try_from(fetched.last_start_position).ok(),
                };
                best_effort(
                    "record entity checkpoint",
                    self.status_repo.record_checkpoint(
                        user_id,
                        &ctx.company_id,
                        entity.state_key(),
                        &checkpoint,
                    ),
                )
                .await;
            }
        }

        Ok(fetched.records.len() as u64)
    }
}

/// Resolves a QuickBooks-backed fetcher for the request's company.
pub struct QuickBooksScopeFactory<C> {
    connections: C,
    pool: PgPool,
    client_config: QboClientConfig,
    incremental: bool,
}

impl<C> QuickBooksScopeFactory<C>
where
    C: ConnectionRepository,
{
    pub fn new(
        connections: C,
        pool: PgPool,
        client_config: QboClientConfig,
        incremental: bool,
    ) -> Self {
        Self {
            connections,
            pool,
            client_config,
            incremental,
        }
    }
}

#[async_trait]
impl<C> ScopeFactory for QuickBooksScopeFactory<C>
where
    C: ConnectionRepository,
{
    async fn resolve(&self, ctx: &SyncContext) -> LedgerResult<Box<dyn EntityFetcher>> {
        let connection = self
            .connections
            .get_by_company(&ctx.company_id)
            .await?
            .ok_or_else(|| {
                LedgerError::NotFound(format!(
                    "no QuickBooks connection for company {}",
                    ctx.company_id
                ))
            })?;

        let client = QboClient::new(
            self.client_config.clone(),
            &connection.realm_id,
            &connection.access_token,
        )
        .map_err(|e| LedgerError::Internal(format!("failed to build qbo client: {e}")))?;

        Ok(Box::new(QuickBooksFetcher::new(
            client,
            PgAccountingRepository::new(self.pool.clone()),
            PgSyncStatusRepository::new(self.pool.clone()),
            self.incremental,
        )))
    }
}
