//! Local copies of QuickBooks Online records, one table per entity type.
//! Every row is keyed by `(company_id, qbo_id)`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub company_id: String,
    pub qbo_id: String,
    pub display_name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub balance: Option<f64>,
    pub active: bool,
    pub updated_at_qbo: Option<DateTime<Utc>>,
    pub raw_ref: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub company_id: String,
    pub qbo_id: String,
    pub display_name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub balance: Option<f64>,
    pub active: bool,
    pub updated_at_qbo: Option<DateTime<Utc>>,
    pub raw_ref: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub company_id: String,
    pub qbo_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub item_type: Option<String>,
    pub unit_price: Option<f64>,
    pub active: bool,
    pub updated_at_qbo: Option<DateTime<Utc>>,
    pub raw_ref: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub company_id: String,
    pub qbo_id: String,
    pub name: String,
    pub account_type: Option<String>,
    pub account_sub_type: Option<String>,
    pub current_balance: Option<f64>,
    pub active: bool,
    pub updated_at_qbo: Option<DateTime<Utc>>,
    pub raw_ref: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub company_id: String,
    pub qbo_id: String,
    pub doc_number: Option<String>,
    pub customer_qbo_id: Option<String>,
    pub txn_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub balance: Option<f64>,
    pub updated_at_qbo: Option<DateTime<Utc>>,
    pub raw_ref: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub company_id: String,
    pub qbo_id: String,
    pub doc_number: Option<String>,
    pub vendor_qbo_id: Option<String>,
    pub txn_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub balance: Option<f64>,
    pub updated_at_qbo: Option<DateTime<Utc>>,
    pub raw_ref: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub company_id: String,
    pub qbo_id: String,
    pub doc_number: Option<String>,
    pub txn_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub line_count: i32,
    pub private_note: Option<String>,
    pub updated_at_qbo: Option<DateTime<Utc>>,
    pub raw_ref: Option<serde_json::Value>,
}
