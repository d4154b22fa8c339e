use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reference to another QBO record (`{"value": "58", "name": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QboRef {
    pub value: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboMetaData {
    pub last_updated_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboEmail {
    pub address: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboCustomer {
    pub id: String,
    pub display_name: String,
    pub company_name: Option<String>,
    pub primary_email_addr: Option<QboEmail>,
    pub balance: Option<f64>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub meta_data: Option<QboMetaData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboVendor {
    pub id: String,
    pub display_name: String,
    pub company_name: Option<String>,
    pub primary_email_addr: Option<QboEmail>,
    pub balance: Option<f64>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub meta_data: Option<QboMetaData>,
}

/// Products and services are `Item` records upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboItem {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    #[serde(rename = "Type")]
    pub item_type: Option<String>,
    pub unit_price: Option<f64>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub meta_data: Option<QboMetaData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboAccount {
    pub id: String,
    pub name: String,
    pub account_type: Option<String>,
    pub account_sub_type: Option<String>,
    pub current_balance: Option<f64>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub meta_data: Option<QboMetaData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboInvoice {
    pub id: String,
    pub doc_number: Option<String>,
    pub customer_ref: Option<QboRef>,
    pub txn_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amt: Option<f64>,
    pub balance: Option<f64>,
    pub meta_data: Option<QboMetaData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboBill {
    pub id: String,
    pub doc_number: Option<String>,
    pub vendor_ref: Option<QboRef>,
    pub txn_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amt: Option<f64>,
    pub balance: Option<f64>,
    pub meta_data: Option<QboMetaData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QboJournalEntry {
    pub id: String,
    pub doc_number: Option<String>,
    pub txn_date: Option<NaiveDate>,
    pub total_amt: Option<f64>,
    pub private_note: Option<String>,
    #[serde(default)]
    pub line: Vec<serde_json::Value>,
    pub meta_data: Option<QboMetaData>,
}

/// Upstream `MetaData.LastUpdatedTime`, if the record carries one.
pub fn last_updated(meta: Option<&QboMetaData>) -> Option<DateTime<Utc>> {
    meta.and_then(|m| m.last_updated_time)
}
