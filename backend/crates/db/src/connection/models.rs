use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth connection between a local company and its QuickBooks realm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QboConnection {
    pub company_id: String,
    pub realm_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub updated_at: DateTime<Utc>,
}
