use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::envelope::{Delivery, Envelope, NackOutcome};
use crate::MessageQueue;
use ledgersync_common::error::{LedgerError, LedgerResult};

/// Redis list queue with an in-flight list for at-least-once delivery.
///
/// Producers `LPUSH` onto `<name>`; consumers `BLMOVE` from its right end
/// onto `<name>:processing`. Ack removes the entry from the processing list;
/// nack moves it back onto `<name>` or onto `<name>:dead`.
#[derive(Clone)]
pub struct RedisQueue {
    connection: ConnectionManager,
    pending_key: String,
    processing_key: String,
    dead_key: String,
    max_deliveries: u32,
}

impl RedisQueue {
    pub async fn connect(redis_url: &str, name: &str, max_deliveries: u32) -> LedgerResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| LedgerError::Queue(format!("{redis_url}: {e}")))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| LedgerError::Queue(format!("failed to connect to redis: {e}")))?;

        tracing::info!(queue = name, max_deliveries, "connected to redis queue");

        Ok(Self {
            connection,
            pending_key: name.to_owned(),
            processing_key: format!("{name}:processing"),
            dead_key: format!("{name}:dead"),
            max_deliveries: max_deliveries.max(1),
        })
    }

    pub fn name(&self) -> &str {
        &self.pending_key
    }

    /// Move everything left in the processing list back to the head of the
    /// queue. Meant for start-up of a single consumer after a crash.
    pub async fn recover_in_flight(&self) -> LedgerResult<usize> {
        let mut conn = self.connection.clone();
        let mut recovered = 0;

        loop {
            let moved: Option<String> = redis::cmd("LMOVE")
                .arg(&self.processing_key)
                .arg(&self.pending_key)
                .arg("RIGHT")
                .arg("RIGHT")
                .query_async(&mut conn)
                .await
                .map_err(|e| LedgerError::Queue(format!("LMOVE failed: {e}")))?;

            match moved {
                Some(_) => recovered += 1,
                None => break,
            }
        }

        if recovered > 0 {
            tracing::warn!(queue = %self.pending_key, recovered, "requeued in-flight messages");
        }
        Ok(recovered)
    }

    /// Length of the dead-letter list.
    pub async fn dead_letter_len(&self) -> LedgerResult<usize> {
        let mut conn = self.connection.clone();
        conn.llen(&self.dead_key)
            .await
            .map_err(|e| LedgerError::Queue(format!("LLEN failed: {e}")))
    }
}

#[async_trait]
impl MessageQueue for RedisQueue {
    async fn enqueue(&self, body: &str) -> LedgerResult<Envelope> {
        let envelope = Envelope::new(body);
        let raw = envelope.encode()?;
        let mut conn = self.connection.clone();

        let _: () = conn
            .lpush(&self.pending_key, raw)
            .await
            .map_err(|e| LedgerError::Queue(format!("LPUSH failed: {e}")))?;

        tracing::debug!(queue = %self.pending_key, message_id = %envelope.id, "message enqueued");
        Ok(envelope)
    }

    async fn receive(&self, timeout: Duration) -> LedgerResult<Option<Delivery>> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = redis::cmd("BLMOVE")
            .arg(&self.pending_key)
            .arg(&self.processing_key)
            .arg("RIGHT")
            .arg("LEFT")
            // 0 would block forever
            .arg(timeout.as_secs_f64().max(0.01))
            .query_async(&mut conn)
            .await
            .map_err(|e| LedgerError::Queue(format!("BLMOVE failed: {e}")))?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match Envelope::decode(&raw) {
            Ok(envelope) => Ok(Some(Delivery { envelope, raw })),
            Err(e) => {
                // Unreadable entries can never be processed; park them.
                tracing::error!(
                    queue = %self.pending_key,
                    error = %e,
                    "dead-lettering undecodable entry"
                );
                let mut pipe = redis::pipe();
                pipe.atomic()
                    .lrem(&self.processing_key, 1, &raw)
                    .ignore()
                    .lpush(&self.dead_key, &raw)
                    .ignore();
                let _: () = pipe
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| LedgerError::Queue(format!("dead-letter failed: {e}")))?;
                Ok(None)
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> LedgerResult<()> {
        let mut conn = self.connection.clone();
        let removed: i64 = conn
            .lrem(&self.processing_key, 1, &delivery.raw)
            .await
            .map_err(|e| LedgerError::Queue(format!("LREM failed: {e}")))?;

        if removed == 0 {
            tracing::warn!(message_id = %delivery.envelope.id, "acked message was not in flight");
        }
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery) -> LedgerResult<NackOutcome> {
        let outcome = delivery.envelope.after_failure(self.max_deliveries);
        let mut pipe = redis::pipe();
        pipe.atomic()
            .lrem(&self.processing_key, 1, &delivery.raw)
            .ignore();

        match outcome {
            NackOutcome::Requeued { delivery_count } => {
                let requeued = Envelope {
                    delivery_count,
                    ..delivery.envelope.clone()
                };
                pipe.lpush(&self.pending_key, requeued.encode()?).ignore();
            }
            NackOutcome::DeadLettered { delivery_count } => {
                let dead = Envelope {
                    delivery_count,
                    ..delivery.envelope.clone()
                };
                pipe.lpush(&self.dead_key, dead.encode()?).ignore();
            }
        }

        let mut conn = self.connection.clone();
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| LedgerError::Queue(format!("nack failed: {e}")))?;

        Ok(outcome)
    }
}
