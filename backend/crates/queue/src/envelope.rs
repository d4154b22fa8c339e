use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ledgersync_common::error::{LedgerError, LedgerResult};

/// What actually sits on the queue: the message body plus delivery bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    pub id: Uuid,
    pub body: String,
    /// Failed deliveries so far.
    pub delivery_count: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl Envelope {
    pub fn new(body: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            body: body.to_owned(),
            delivery_count: 0,
            enqueued_at: Utc::now(),
        }
    }

    pub fn encode(&self) -> LedgerResult<String> {
        serde_json::to_string(self).map_err(|e| LedgerError::Queue(format!("encode envelope: {e}")))
    }

    pub fn decode(raw: &str) -> LedgerResult<Self> {
        serde_json::from_str(raw).map_err(|e| LedgerError::Queue(format!("decode envelope: {e}")))
    }

    /// Decide what a failed delivery turns into under a `max_deliveries` budget.
    pub fn after_failure(&self, max_deliveries: u32) -> NackOutcome {
        let delivery_count = self.delivery_count + 1;
        if delivery_count >= max_deliveries {
            NackOutcome::DeadLettered { delivery_count }
        } else {
            NackOutcome::Requeued { delivery_count }
        }
    }
}

/// A received message. `raw` is the exact list entry, needed to remove it
/// from the in-flight list.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub envelope: Envelope,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NackOutcome {
    Requeued { delivery_count: u32 },
    DeadLettered { delivery_count: u32 },
}
