use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::sync::models::{
    CoarseSyncStatus, CompanySyncStatus, EntitySyncState, EntitySyncStatus, EntityType,
    SyncCheckpoint,
};
use crate::sync::repositories::SyncStatusRepository;
use ledgersync_common::error::{LedgerError, LedgerResult};

const ENTITY_STATE_COLUMNS: &str = "id, user_id, company_id, entity_type, last_updated_after, \
     last_start_position, last_run_at, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgSyncStatusRepository {
    pool: PgPool,
}

impl PgSyncStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_company_row(row: sqlx::postgres::PgRow) -> LedgerResult<CompanySyncStatus> {
        let status: String = row.get("status");
        Ok(CompanySyncStatus {
            company_id: row.get("company_id"),
            status: status.parse().map_err(LedgerError::Database)?,
            detail: row.get("detail"),
            updated_at: row.get("updated_at"),
        })
    }

    fn map_entity_row(row: sqlx::postgres::PgRow) -> LedgerResult<EntitySyncState> {
        let entity_type: String = row.get("entity_type");
        let status: String = row.get("status");
        Ok(EntitySyncState {
            id: row.get("id"),
            user_id: row.get("user_id"),
            company_id: row.get("company_id"),
            entity_type: entity_type.parse().map_err(LedgerError::Database)?,
            last_updated_after: row.get("last_updated_after"),
            last_start_position: row.get("last_start_position"),
            last_run_at: row.get("last_run_at"),
            status: status.parse().map_err(LedgerError::Database)?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl SyncStatusRepository for PgSyncStatusRepository {
    async fn set_coarse_status(
        &self,
        company_id: &str,
        status: CoarseSyncStatus,
        detail: Option<&str>,
    ) -> LedgerResult<()> {
        sqlx::query(
            "insert into company_sync_status (company_id, status, detail, updated_at)
             values ($1, $2, $3, $4)
             on conflict (company_id) do update set
               status = excluded.status,
               detail = excluded.detail,
               updated_at = excluded.updated_at",
        )
        .bind(company_id)
        .bind(status.as_str())
        .bind(detail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_coarse_status(&self, company_id: &str) -> LedgerResult<Option<CompanySyncStatus>> {
        let row = sqlx::query(
            "select company_id, status, detail, updated_at
             from company_sync_status where company_id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        row.map(Self::map_company_row).transpose()
    }

    async fn set_entity_state(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
        status: EntitySyncStatus,
    ) -> LedgerResult<()> {
        let now = Utc::now();
        let run_at = (status == EntitySyncStatus::Running).then_some(now);
        sqlx::query(
            "insert into entity_sync_state
               (id, user_id, company_id, entity_type, status, last_run_at, created_at, updated_at)
             values ($1, $2, $3, $4, $5, $6, $7, $7)
             on conflict (user_id, company_id, entity_type) do update set
               status = excluded.status,
               last_run_at = coalesce(excluded.last_run_at, entity_sync_state.last_run_at),
               updated_at = excluded.updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(company_id)
        .bind(entity_type.as_str())
        .bind(status.as_str())
        .bind(run_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_entity_state(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
    ) -> LedgerResult<Option<EntitySyncState>> {
        let sql = format!(
            "select {ENTITY_STATE_COLUMNS} from entity_sync_state
             where user_id = $1 and company_id = $2 and entity_type = $3"
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(company_id)
            .bind(entity_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        row.map(Self::map_entity_row).transpose()
    }

    async fn record_checkpoint(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
        checkpoint: &SyncCheckpoint,
    ) -> LedgerResult<()> {
        let result = sqlx::query(
            "update entity_sync_state
             set last_updated_after = $1, last_start_position = $2, updated_at = $3
             where user_id = $4 and company_id = $5 and entity_type = $6",
        )
        .bind(checkpoint.last_updated_after)
        .bind(checkpoint.last_start_position)
        .bind(Utc::now())
        .bind(user_id)
        .bind(company_id)
        .bind(entity_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound(format!(
                "entity sync state {entity_type} for company {company_id}"
            )));
        }
        Ok(())
    }

    async fn list_entity_states(&self, company_id: &str) -> LedgerResult<Vec<EntitySyncState>> {
        let sql = format!(
            "select {ENTITY_STATE_COLUMNS} from entity_sync_state
             where company_id = $1 order by user_id, entity_type"
        );
        let rows = sqlx::query(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        rows.into_iter().map(Self::map_entity_row).collect()
    }
}
