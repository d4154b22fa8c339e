//! Upstream JSON → local rows. Each mapper keeps the raw record in `raw_ref`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use ledgersync_common::error::{LedgerError, LedgerResult};
use ledgersync_db::accounting::models::{
    Account, Bill, Customer, Invoice, JournalEntry, Product, Vendor,
};

use super::models::{
    last_updated, QboAccount, QboBill, QboCustomer, QboInvoice, QboItem, QboJournalEntry,
    QboVendor,
};

fn decode<T: DeserializeOwned>(entity: &str, raw: &Value) -> LedgerResult<T> {
    serde_json::from_value(raw.clone())
        .map_err(|e| LedgerError::Upstream(format!("invalid {entity} record: {e}")))
}

pub fn customer_row(company_id: &str, raw: &Value) -> LedgerResult<Customer> {
    let c: QboCustomer = decode("Customer", raw)?;
    Ok(Customer {
        id: Uuid::new_v4(),
        company_id: company_id.to_string(),
        qbo_id: c.id,
        display_name: c.display_name,
        company_name: c.company_name,
        email: c.primary_email_addr.and_then(|e| e.address),
        balance: c.balance,
        active: c.active,
        updated_at_qbo: last_updated(c.meta_data.as_ref()),
        raw_ref: Some(raw.clone()),
    })
}

pub fn vendor_row(company_id: &str, raw: &Value) -> LedgerResult<Vendor> {
    let v: QboVendor = decode("Vendor", raw)?;
    Ok(Vendor {
        id: Uuid::new_v4(),
        company_id: company_id.to_string(),
        qbo_id: v.id,
        display_name: v.display_name,
        company_name: v.company_name,
        email: v.primary_email_addr.and_then(|e| e.address),
        balance: v.balance,
        active: v.active,
        updated_at_qbo: last_updated(v.meta_data.as_ref()),
        raw_ref: Some(raw.clone()),
    })
}

pub fn product_row(company_id: &str, raw: &Value) -> LedgerResult<Product> {
    let i: QboItem = decode("Item", raw)?;
    Ok(Product {
        id: Uuid::new_v4(),
        company_id: company_id.to_string(),
        qbo_id: i.id,
        name: i.name,
        sku: i.sku,
        item_type: i.item_type,
        unit_price: i.unit_price,
        active: i.active,
        updated_at_qbo: last_updated(i.meta_data.as_ref()),
        raw_ref: Some(raw.clone()),
    })
}

pub fn account_row(company_id: &str, raw: &Value) -> LedgerResult<Account> {
    let a: QboAccount = decode("Account", raw)?;
    Ok(Account {
        id: Uuid::new_v4(),
        company_id: company_id.to_string(),
        qbo_id: a.id,
        name: a.name,
        account_type: a.account_type,
        account_sub_type: a.account_sub_type,
        current_balance: a.current_balance,
        active: a.active,
        updated_at_qbo: last_updated(a.meta_data.as_ref()),
        raw_ref: Some(raw.clone()),
    })
}

pub fn invoice_row(company_id: &str, raw: &Value) -> LedgerResult<Invoice> {
    let i: QboInvoice = decode("Invoice", raw)?;
    Ok(Invoice {
        id: Uuid::new_v4(),
        company_id: company_id.to_string(),
        qbo_id: i.id,
        doc_number: i.doc_number,
        customer_qbo_id: i.customer_ref.map(|r| r.value),
        txn_date: i.txn_date,
        due_date: i.due_date,
        total_amount: i.total_amt,
        balance: i.balance,
        updated_at_qbo: last_updated(i.meta_data.as_ref()),
        raw_ref: Some(raw.clone()),
    })
}

pub fn bill_row(company_id: &str, raw: &Value) -> LedgerResult<Bill> {
    let b: QboBill = decode("Bill", raw)?;
    Ok(Bill {
        id: Uuid::new_v4(),
        company_id: company_id.to_string(),
        qbo_id: b.id,
        doc_number: b.doc_number,
        vendor_qbo_id: b.vendor_ref.map(|r| r.value),
        txn_date: b.txn_date,
        due_date: b.due_date,
        total_amount: b.total_amt,
        balance: b.balance,
        updated_at_qbo: last_updated(b.meta_data.as_ref()),
        raw_ref: Some(raw.clone()),
    })
}

pub fn journal_entry_row(company_id: &str, raw: &Value) -> LedgerResult<JournalEntry> {
    let j: QboJournalEntry = decode("JournalEntry", raw)?;
    Ok(JournalEntry {
        id: Uuid::new_v4(),
        company_id: company_id.to_string(),
        qbo_id: j.id,
        doc_number: j.doc_number,
        txn_date: j.txn_date,
        total_amount: j.total_amt,
        line_count: i32::try_from(j.line.len()).unwrap_or(i32::MAX),
        private_note: j.private_note,
        updated_at_qbo: last_updated(j.meta_data.as_ref()),
        raw_ref: Some(raw.clone()),
    })
}
