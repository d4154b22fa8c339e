use std::time::Duration;

use tokio::sync::watch;

use ledgersync_common::error::LedgerResult;
use ledgersync_queue::{Delivery, MessageQueue, NackOutcome};

use super::MessageHandler;

/// Pulls deliveries off a [`MessageQueue`] and feeds them to a handler:
/// ack on success, nack on error.
pub struct QueueConsumer<Q, H> {
    queue: Q,
    handler: H,
    poll_timeout: Duration,
}

impl<Q, H> QueueConsumer<Q, H>
where
    Q: MessageQueue,
    H: MessageHandler,
{
    pub fn new(queue: Q, handler: H, poll_timeout: Duration) -> Self {
        Self {
            queue,
            handler,
            poll_timeout,
        }
    }

    /// Receive and process at most one message. `Ok(false)` means the poll
    /// timed out with nothing to do.
    pub async fn process_next(&self) -> LedgerResult<bool> {
        match self.queue.receive(self.poll_timeout).await? {
            Some(delivery) => {
                self.process(delivery).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn process(&self, delivery: Delivery) -> LedgerResult<()> {
        let message_id = delivery.envelope.id;
        let delivery_count = delivery.envelope.delivery_count;

        match self.handler.handle(&delivery.envelope.body).await {
            Ok(()) => {
                self.queue.ack(&delivery).await?;
                tracing::info!(%message_id, "message acknowledged");
            }
            Err(e) => match self.queue.nack(&delivery).await? {
                NackOutcome::Requeued { delivery_count } => {
                    tracing::warn!(
                        %message_id,
                        delivery_count,
                        error = %e,
                        "message failed, requeued"
                    );
                }
                NackOutcome::DeadLettered { delivery_count } => {
                    tracing::error!(
                        %message_id,
                        delivery_count,
                        error = %e,
                        "message failed, dead-lettered"
                    );
                }
            },
        }

        tracing::debug!(%message_id, previous_failures = delivery_count, "delivery processed");
        Ok(())
    }

    /// Consume until `shutdown` flips to `true` or its sender goes away.
    ///
    /// Shutdown interrupts only the wait for a message; a message already
    /// being handled runs to completion.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("queue consumer started");

        while !*shutdown.borrow() {
            let received = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                received = self.queue.receive(self.poll_timeout) => received,
            };

            let result = match received {
                Ok(Some(delivery)) => self.process(delivery).await,
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                tracing::error!(error = %e, "queue error, backing off");
                tokio::time::sleep(self.poll_timeout).await;
            }
        }

        tracing::info!("queue consumer stopped");
    }
}
