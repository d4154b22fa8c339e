//! In-memory doubles shared by the worker's unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use ledgersync_common::error::{LedgerError, LedgerResult};
use ledgersync_db::accounting::models::{
    Account, Bill, Customer, Invoice, JournalEntry, Product, Vendor,
};
use ledgersync_db::accounting::repositories::AccountingRepository;
use ledgersync_db::sync::models::{
    CoarseSyncStatus, CompanySyncStatus, EntitySyncState, EntitySyncStatus, EntityType,
    SyncCheckpoint,
};
use ledgersync_db::sync::repositories::SyncStatusRepository;

#[derive(Default)]
struct StatusState {
    coarse: HashMap<String, CompanySyncStatus>,
    coarse_log: Vec<(String, CoarseSyncStatus, Option<String>)>,
    entities: HashMap<(i64, String, EntityType), EntitySyncState>,
    entity_log: Vec<(String, EntityType, EntitySyncStatus)>,
    fail_coarse_on: HashSet<&'static str>,
    fail_entity_writes: bool,
}

/// Status store that keeps every write so tests can assert on transitions.
#[derive(Clone, Default)]
pub struct InMemoryStatusRepo {
    state: Arc<Mutex<StatusState>>,
}

impl InMemoryStatusRepo {
    /// Make every coarse write of `status` fail with a database error.
    pub fn fail_coarse_on(&self, status: CoarseSyncStatus) {
        self.state
            .lock()
            .unwrap()
            .fail_coarse_on
            .insert(status.as_str());
    }

    pub fn fail_entity_writes(&self) {
        self.state.lock().unwrap().fail_entity_writes = true;
    }

    /// Coarse statuses written for `company_id`, in order, failed writes excluded.
    pub fn coarse_history(&self, company_id: &str) -> Vec<CoarseSyncStatus> {
        self.state
            .lock()
            .unwrap()
            .coarse_log
            .iter()
            .filter(|(c, _, _)| c == company_id)
            .map(|(_, s, _)| *s)
            .collect()
    }

    pub fn coarse_final(&self, company_id: &str) -> Option<CompanySyncStatus> {
        self.state.lock().unwrap().coarse.get(company_id).cloned()
    }

    pub fn entity_history(
        &self,
        company_id: &str,
        entity_type: EntityType,
    ) -> Vec<EntitySyncStatus> {
        self.state
            .lock()
            .unwrap()
            .entity_log
            .iter()
            .filter(|(c, t, _)| c == company_id && *t == entity_type)
            .map(|(_, _, s)| *s)
            .collect()
    }

    pub fn entity_final(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
    ) -> Option<EntitySyncStatus> {
        self.state
            .lock()
            .unwrap()
            .entities
            .get(&(user_id, company_id.to_string(), entity_type))
            .map(|s| s.status)
    }

    pub fn entity_write_count(&self) -> usize {
        self.state.lock().unwrap().entity_log.len()
    }
}

#[async_trait]
impl SyncStatusRepository for InMemoryStatusRepo {
    async fn set_coarse_status(
        &self,
        company_id: &str,
        status: CoarseSyncStatus,
        detail: Option<&str>,
    ) -> LedgerResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_coarse_on.contains(status.as_str()) {
            return Err(LedgerError::Database(format!(
                "injected failure writing {status}"
            )));
        }
        state.coarse_log.push((
            company_id.to_string(),
            status,
            detail.map(str::to_string),
        ));
        state.coarse.insert(
            company_id.to_string(),
            CompanySyncStatus {
                company_id: company_id.to_string(),
                status,
                detail: detail.map(str::to_string),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_coarse_status(&self, company_id: &str) -> LedgerResult<Option<CompanySyncStatus>> {
        Ok(self.coarse_final(company_id))
    }

    async fn set_entity_state(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
        status: EntitySyncStatus,
    ) -> LedgerResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_entity_writes {
            return Err(LedgerError::Database("injected entity write failure".into()));
        }
        state
            .entity_log
            .push((company_id.to_string(), entity_type, status));

        let now = Utc::now();
        let row = state
            .entities
            .entry((user_id, company_id.to_string(), entity_type))
            .or_insert_with(|| EntitySyncState {
                id: Uuid::new_v4(),
                user_id,
                company_id: company_id.to_string(),
                entity_type,
                last_updated_after: None,
                last_start_position: None,
                last_run_at: None,
                status,
                created_at: now,
                updated_at: now,
            });
        row.status = status;
        row.updated_at = now;
        if status == EntitySyncStatus::Running {
            row.last_run_at = Some(now);
        }
        Ok(())
    }

    async fn get_entity_state(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
    ) -> LedgerResult<Option<EntitySyncState>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .entities
            .get(&(user_id, company_id.to_string(), entity_type))
            .cloned())
    }

    async fn record_checkpoint(
        &self,
        user_id: i64,
        company_id: &str,
        entity_type: EntityType,
        checkpoint: &SyncCheckpoint,
    ) -> LedgerResult<()> {
        let mut state = self.state.lock().unwrap();
        let row = state
            .entities
            .get_mut(&(user_id, company_id.to_string(), entity_type))
            .ok_or_else(|| LedgerError::NotFound(format!("entity state {entity_type}")))?;
        row.last_updated_after = checkpoint.last_updated_after;
        row.last_start_position = checkpoint.last_start_position;
        Ok(())
    }

    async fn list_entity_states(&self, company_id: &str) -> LedgerResult<Vec<EntitySyncState>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .entities
            .values()
            .filter(|s| s.company_id == company_id)
            .cloned()
            .collect())
    }
}

/// Accounting store that records upserted `(table, qbo_id)` pairs.
#[derive(Clone, Default)]
pub struct RecordingAccountingRepo {
    upserts: Arc<Mutex<Vec<(&'static str, String)>>>,
    fail: bool,
}

impl RecordingAccountingRepo {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn upserted(&self, table: &str) -> Vec<String> {
        self.upserts
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == table)
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn distinct_keys(&self, table: &str) -> usize {
        self.upserted(table)
            .into_iter()
            .collect::<HashSet<_>>()
            .len()
    }

    fn record(&self, table: &'static str, qbo_id: &str) -> LedgerResult<()> {
        if self.fail {
            return Err(LedgerError::Database(format!("injected {table} failure")));
        }
        self.upserts
            .lock()
            .unwrap()
            .push((table, qbo_id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl AccountingRepository for RecordingAccountingRepo {
    async fn upsert_customer(&self, customer: &Customer) -> LedgerResult<()> {
        self.record("customers", &customer.qbo_id)
    }

    async fn upsert_vendor(&self, vendor: &Vendor) -> LedgerResult<()> {
        self.record("vendors", &vendor.qbo_id)
    }

    async fn upsert_product(&self, product: &Product) -> LedgerResult<()> {
        self.record("products", &product.qbo_id)
    }

    async fn upsert_account(&self, account: &Account) -> LedgerResult<()> {
        self.record("accounts", &account.qbo_id)
    }

    async fn upsert_invoice(&self, invoice: &Invoice) -> LedgerResult<()> {
        self.record("invoices", &invoice.qbo_id)
    }

    async fn upsert_bill(&self, bill: &Bill) -> LedgerResult<()> {
        self.record("bills", &bill.qbo_id)
    }

    async fn upsert_journal_entry(&self, entry: &JournalEntry) -> LedgerResult<()> {
        self.record("journal_entries", &entry.qbo_id)
    }
}
