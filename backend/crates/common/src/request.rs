use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// "Start full sync" message carried by the sync queue.
///
/// Missing `CompanyId`/`UserId` deserialize to empty strings so that both
/// missing and blank ids fail the same validation. A missing `RequestedAt`
/// defaults to the time of parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "Utc::now")]
    pub requested_at: DateTime<Utc>,
}

impl SyncRequest {
    pub fn new(company_id: &str, user_id: &str) -> Self {
        Self {
            company_id: company_id.to_owned(),
            user_id: user_id.to_owned(),
            requested_at: Utc::now(),
        }
    }

    /// Parse and validate a queue message body.
    pub fn from_json(body: &str) -> LedgerResult<Self> {
        let request: Self = serde_json::from_str(body)
            .map_err(|e| LedgerError::Validation(format!("malformed sync request: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    pub fn to_json(&self) -> LedgerResult<String> {
        serde_json::to_string(self).map_err(|e| LedgerError::Internal(e.to_string()))
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.company_id.trim().is_empty() {
            return Err(LedgerError::Validation("CompanyId is required".to_string()));
        }
        if self.user_id.trim().is_empty() {
            return Err(LedgerError::Validation("UserId is required".to_string()));
        }
        Ok(())
    }
}
