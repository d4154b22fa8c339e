use async_trait::async_trait;

use crate::connection::models::QboConnection;
use ledgersync_common::error::LedgerResult;

#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn get_by_company(&self, company_id: &str) -> LedgerResult<Option<QboConnection>>;
}
