use async_trait::async_trait;

use crate::sync::models::{
    CoarseSyncStatus, CompanySyncStatus, EntitySyncState, EntitySyncStatus, EntityType,
    SyncCheckpoint,
};
use ledgersync_common::error::LedgerResult;

#[async_trait]
pub trait SyncStatusRepository: Send + Sync {
    /// Upsert the company-level status row. Last write wins.
    async fn set_coarse_status(
        &self,
        company_id: &str,
        status: CoarseSyncStatus,
        detail: Option<&str>,
    ) -> LedgerResult<()>;

    async fn get_coarse_status(&self, company_id: &str) -> LedgerResult<Option<CompanySyncStatus>>;

    /// Upsert the status of one (user, company, entity type) row.
    /// Moving to `Running` also stamps `last_run_at`.
    async fn set_entity_state(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
        status: EntitySyncStatus,
    ) -> LedgerResult<()>;

    async fn get_entity_state(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
    ) -> LedgerResult<Option<EntitySyncState>>;

    /// Store incremental-sync checkpoint fields without touching status.
    async fn record_checkpoint(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
        checkpoint: &SyncCheckpoint,
    ) -> LedgerResult<()>;

    async fn list_entity_states(&self, company_id: &str) -> LedgerResult<Vec<EntitySyncState>>;
}
