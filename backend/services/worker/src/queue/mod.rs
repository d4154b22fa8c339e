pub mod consumer;

use async_trait::async_trait;
use ledgersync_common::error::LedgerResult;

pub use consumer::QueueConsumer;

/// Processes one message body. `Ok` acknowledges the delivery, `Err` hands
/// it back to the channel.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, body: &str) -> LedgerResult<()>;
}
