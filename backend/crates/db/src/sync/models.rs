use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Company-level outcome of a full-sync run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoarseSyncStatus {
    Running,
    Completed,
    PartiallyFailed,
    Failed,
}

impl CoarseSyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::PartiallyFailed => "PartiallyFailed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for CoarseSyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoarseSyncStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Running" => Ok(Self::Running),
            "Completed" => Ok(Self::Completed),
            "PartiallyFailed" => Ok(Self::PartiallyFailed),
            "Failed" => Ok(Self::Failed),
            _ => Err(format!("unknown sync status: {value}")),
        }
    }
}

/// Per-entity-type status inside one run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntitySyncStatus {
    Running,
    Completed,
    Failed,
}

impl EntitySyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for EntitySyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntitySyncStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Running" => Ok(Self::Running),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            _ => Err(format!("unknown entity sync status: {value}")),
        }
    }
}

/// Key of an entity-state row. The set is closed; stored names are the
/// variant names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityType {
    Invoice,
    Customer,
    ChartOfAccounts,
    Products,
    ManualJournals,
    Bills,
    Vendors,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        Self::Invoice,
        Self::Customer,
        Self::ChartOfAccounts,
        Self::Products,
        Self::ManualJournals,
        Self::Bills,
        Self::Vendors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::Customer => "Customer",
            Self::ChartOfAccounts => "ChartOfAccounts",
            Self::Products => "Products",
            Self::ManualJournals => "ManualJournals",
            Self::Bills => "Bills",
            Self::Vendors => "Vendors",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| format!("unknown entity type: {value}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySyncStatus {
    pub company_id: String,
    pub status: CoarseSyncStatus,
    pub detail: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySyncState {
    pub id: Uuid,
    pub user_id: i64,
    pub company_id: String,
    pub entity_type: EntityType,
    pub last_updated_after: Option<DateTime<Utc>>,
    pub last_start_position: Option<i32>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub status: EntitySyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incremental-sync bookmark written after a successful pull.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncCheckpoint {
    pub last_updated_after: Option<DateTime<Utc>>,
    pub last_start_position: Option<i32>,
}
