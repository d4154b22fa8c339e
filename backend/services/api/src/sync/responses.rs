use chrono::{DateTime, Utc};
use ledgersync_db::sync::models::{CompanySyncStatus, EntitySyncState};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SyncAcceptedResponse {
    pub message_id: Uuid,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusData {
    pub company: CompanySyncStatus,
    pub entities: Vec<EntitySyncState>,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub data: SyncStatusData,
}
