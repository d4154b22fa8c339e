use async_trait::async_trait;

use crate::accounting::models::{Account, Bill, Customer, Invoice, JournalEntry, Product, Vendor};
use ledgersync_common::error::LedgerResult;

/// Persistence for synced QuickBooks records.
///
/// Every method is an upsert on `(company_id, qbo_id)`: calling it again with
/// the same upstream record updates the existing row instead of adding one.
#[async_trait]
pub trait AccountingRepository: Send + Sync {
    async fn upsert_customer(&self, customer: &Customer) -> LedgerResult<()>;
    async fn upsert_vendor(&self, vendor: &Vendor) -> LedgerResult<()>;
    async fn upsert_product(&self, product: &Product) -> LedgerResult<()>;
    async fn upsert_account(&self, account: &Account) -> LedgerResult<()>;
    async fn upsert_invoice(&self, invoice: &Invoice) -> LedgerResult<()>;
    async fn upsert_bill(&self, bill: &Bill) -> LedgerResult<()>;
    async fn upsert_journal_entry(&self, entry: &JournalEntry) -> LedgerResult<()>;
}
