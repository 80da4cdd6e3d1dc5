//! Pool-scoped envelope around [`LedgerEvent`] audit records.
//!
//! The service layer stamps each record with its pool and a timestamp before
//! broadcasting it through the [`super::EventBus`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{LedgerEvent, PoolId};

/// Audit record as broadcast to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct PoolEvent {
    /// Pool the record belongs to.
    pub pool_id: PoolId,
    /// Legacy event identity (e.g. `"InvestedEvent"`).
    pub event_name: &'static str,
    /// Audit record, flattened into the envelope.
    #[serde(flatten)]
    pub record: LedgerEvent,
    /// Time the mutation was applied.
    pub timestamp: DateTime<Utc>,
}

impl PoolEvent {
    /// Stamps `record` with its pool and the current time.
    #[must_use]
    pub fn new(pool_id: PoolId, record: LedgerEvent) -> Self {
        Self {
            pool_id,
            event_name: record.event_name(),
            record,
            timestamp: Utc::now(),
        }
    }

    /// Returns the pool ID associated with this event.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Returns the snake-case event type.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        self.record.event_type_str()
    }
}
