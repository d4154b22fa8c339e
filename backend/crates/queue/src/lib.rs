//! At-least-once delivery channel for full-sync requests.
//!
//! [`MessageQueue`] is the transport seam; [`RedisQueue`] implements it with
//! the list-based reliable-queue pattern (pending list, processing list,
//! dead-letter list).

pub mod envelope;
pub mod redis_queue;

use std::time::Duration;

use async_trait::async_trait;
use ledgersync_common::error::LedgerResult;

pub use envelope::{Delivery, Envelope, NackOutcome};
pub use redis_queue::RedisQueue;

#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Wrap `body` in a fresh envelope and append it to the queue.
    async fn enqueue(&self, body: &str) -> LedgerResult<Envelope>;

    /// Wait up to `timeout` for the next message. The message stays in flight
    /// until it is acked or nacked.
    async fn receive(&self, timeout: Duration) -> LedgerResult<Option<Delivery>>;

    /// Drop a processed message for good.
    async fn ack(&self, delivery: &Delivery) -> LedgerResult<()>;

    /// Hand a failed message back for redelivery, or dead-letter it once its
    /// delivery budget is spent.
    async fn nack(&self, delivery: &Delivery) -> LedgerResult<NackOutcome>;
}
