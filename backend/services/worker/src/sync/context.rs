use chrono::{DateTime, Utc};

use ledgersync_common::request::SyncRequest;

/// Who and what a sync run is for. Passed explicitly to every collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    pub company_id: String,
    /// Numeric user id; `None` disables entity-state bookkeeping for the run.
    pub user_id: Option<i64>,
    pub requested_at: DateTime<Utc>,
}

impl SyncContext {
    pub fn from_request(request: &SyncRequest) -> Self {
        let user_id = match request.user_id.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(
                    company_id = %request.company_id,
                    user_id = %request.user_id,
                    "user id is not numeric, skipping entity-state updates"
                );
                None
            }
        };

        Self {
            company_id: request.company_id.trim().to_string(),
            user_id,
            requested_at: request.requested_at,
        }
    }
}
