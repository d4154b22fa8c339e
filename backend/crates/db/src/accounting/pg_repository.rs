use async_trait::async_trait;
use sqlx::PgPool;

use crate::accounting::models::{Account, Bill, Customer, Invoice, JournalEntry, Product, Vendor};
use crate::accounting::repositories::AccountingRepository;
use ledgersync_common::error::{LedgerError, LedgerResult};

#[derive(Clone)]
pub struct PgAccountingRepository {
    pool: PgPool,
}

impl PgAccountingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountingRepository for PgAccountingRepository {
    async fn upsert_customer(&self, c: &Customer) -> LedgerResult<()> {
        sqlx::query(
            "insert into customers
             (id, company_id, qbo_id, display_name, company_name, email, balance, active,
              updated_at_qbo, raw_ref)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             on conflict (company_id, qbo_id) do update set
               display_name = excluded.display_name,
               company_name = excluded.company_name,
               email = excluded.email,
               balance = excluded.balance,
               active = excluded.active,
               updated_at_qbo = excluded.updated_at_qbo,
               raw_ref = excluded.raw_ref,
               updated_at = now()",
        )
        .bind(c.id)
        .bind(&c.company_id)
        .bind(&c.qbo_id)
        .bind(&c.display_name)
        .bind(&c.company_name)
        .bind(&c.email)
        .bind(c.balance)
        .bind(c.active)
        .bind(c.updated_at_qbo)
        .bind(&c.raw_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_vendor(&self, v: &Vendor) -> LedgerResult<()> {
        sqlx::query(
            "insert into vendors
             (id, company_id, qbo_id, display_name, company_name, email, balance, active,
              updated_at_qbo, raw_ref)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             on conflict (company_id, qbo_id) do update set
               display_name = excluded.display_name,
               company_name = excluded.company_name,
               email = excluded.email,
               balance = excluded.balance,
               active = excluded.active,
               updated_at_qbo = excluded.updated_at_qbo,
               raw_ref = excluded.raw_ref,
               updated_at = now()",
        )
        .bind(v.id)
        .bind(&v.company_id)
        .bind(&v.qbo_id)
        .bind(&v.display_name)
        .bind(&v.company_name)
        .bind(&v.email)
        .bind(v.balance)
        .bind(v.active)
        .bind(v.updated_at_qbo)
        .bind(&v.raw_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_product(&self, p: &Product) -> LedgerResult<()> {
        sqlx::query(
            "insert into products
             (id, company_id, qbo_id, name, sku, item_type, unit_price, active,
              updated_at_qbo, raw_ref)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             on conflict (company_id, qbo_id) do update set
               name = excluded.name,
               sku = excluded.sku,
               item_type = excluded.item_type,
               unit_price = excluded.unit_price,
               active = excluded.active,
               updated_at_qbo = excluded.updated_at_qbo,
               raw_ref = excluded.raw_ref,
               updated_at = now()",
        )
        .bind(p.id)
        .bind(&p.company_id)
        .bind(&p.qbo_id)
        .bind(&p.name)
        .bind(&p.sku)
        .bind(&p.item_type)
        .bind(p.unit_price)
        .bind(p.active)
        .bind(p.updated_at_qbo)
        .bind(&p.raw_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_account(&self, a: &Account) -> LedgerResult<()> {
        sqlx::query(
            "insert into accounts
             (id, company_id, qbo_id, name, account_type, account_sub_type, current_balance,
              active, updated_at_qbo, raw_ref)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             on conflict (company_id, qbo_id) do update set
               name = excluded.name,
               account_type = excluded.account_type,
               account_sub_type = excluded.account_sub_type,
               current_balance = excluded.current_balance,
               active = excluded.active,
               updated_at_qbo = excluded.updated_at_qbo,
               raw_ref = excluded.raw_ref,
               updated_at = now()",
        )
        .bind(a.id)
        .bind(&a.company_id)
        .bind(&a.qbo_id)
        .bind(&a.name)
        .bind(&a.account_type)
        .bind(&a.account_sub_type)
        .bind(a.current_balance)
        .bind(a.active)
        .bind(a.updated_at_qbo)
        .bind(&a.raw_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_invoice(&self, i: &Invoice) -> LedgerResult<()> {
        sqlx::query(
            "insert into invoices
             (id, company_id, qbo_id, doc_number, customer_qbo_id, txn_date, due_date,
              total_amount, balance, updated_at_qbo, raw_ref)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             on conflict (company_id, qbo_id) do update set
               doc_number = excluded.doc_number,
               customer_qbo_id = excluded.customer_qbo_id,
               txn_date = excluded.txn_date,
               due_date = excluded.due_date,
               total_amount = excluded.total_amount,
               balance = excluded.balance,
               updated_at_qbo = excluded.updated_at_qbo,
               raw_ref = excluded.raw_ref,
               updated_at = now()",
        )
        .bind(i.id)
        .bind(&i.company_id)
        .bind(&i.qbo_id)
        .bind(&i.doc_number)
        .bind(&i.customer_qbo_id)
        .bind(i.txn_date)
        .bind(i.due_date)
        .bind(i.total_amount)
        .bind(i.balance)
        .bind(i.updated_at_qbo)
        .bind(&i.raw_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_bill(&self, b: &Bill) -> LedgerResult<()> {
        sqlx::query(
            "insert into bills
             (id, company_id, qbo_id, doc_number, vendor_qbo_id, txn_date, due_date,
              total_amount, balance, updated_at_qbo, raw_ref)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             on conflict (company_id, qbo_id) do update set
               doc_number = excluded.doc_number,
               vendor_qbo_id = excluded.vendor_qbo_id,
               txn_date = excluded.txn_date,
               due_date = excluded.due_date,
               total_amount = excluded.total_amount,
               balance = excluded.balance,
               updated_at_qbo = excluded.updated_at_qbo,
               raw_ref = excluded.raw_ref,
               updated_at = now()",
        )
        .bind(b.id)
        .bind(&b.company_id)
        .bind(&b.qbo_id)
        .bind(&b.doc_number)
        .bind(&b.vendor_qbo_id)
        .bind(b.txn_date)
        .bind(b.due_date)
        .bind(b.total_amount)
        .bind(b.balance)
        .bind(b.updated_at_qbo)
        .bind(&b.raw_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_journal_entry(&self, j: &JournalEntry) -> LedgerResult<()> {
        sqlx::query(
            "insert into journal_entries
             (id, company_id, qbo_id, doc_number, txn_date, total_amount, line_count,
              private_note, updated_at_qbo, raw_ref)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             on conflict (company_id, qbo_id) do update set
               doc_number = excluded.doc_number,
               txn_date = excluded.txn_date,
               total_amount = excluded.total_amount,
               line_count = excluded.line_count,
               private_note = excluded.private_note,
               updated_at_qbo = excluded.updated_at_qbo,
               raw_ref = excluded.raw_ref,
               updated_at = now()",
        )
        .bind(j.id)
        .bind(&j.company_id)
        .bind(&j.qbo_id)
        .bind(&j.doc_number)
        .bind(j.txn_date)
        .bind(j.total_amount)
        .bind(j.line_count)
        .bind(&j.private_note)
        .bind(j.updated_at_qbo)
        .bind(&j.raw_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }
}
