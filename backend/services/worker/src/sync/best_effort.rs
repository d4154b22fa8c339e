use std::future::Future;

use ledgersync_common::error::LedgerResult;

/// Run a bookkeeping write whose failure must never change the caller's
/// outcome. Failures are logged at `warn` and turned into `None`.
pub async fn best_effort<T, F>(action: &str, write: F) -> Option<T>
where
    F: Future<Output = LedgerResult<T>>,
{
    match write.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(action, error = %e, "best-effort write failed");
            None
        }
    }
}
