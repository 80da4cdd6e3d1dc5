//! Pool entry combining a [`PoolEngine`] with gateway metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Amount, PoolEngine, PoolId};

/// Aggregate stored per pool in the [`super::PoolRegistry`].
///
/// `engine` holds the ledger state; the remaining fields are operational
/// metadata maintained by the service layer.
#[derive(Debug)]
pub struct PoolEntry {
    /// Pool identifier (immutable after creation).
    pub pool_id: PoolId,

    /// Ledger of this pool.
    pub engine: PoolEngine,

    /// Optional human-readable name.
    pub name: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last successful mutation.
    pub last_modified_at: DateTime<Utc>,

    /// Number of successful mutations applied.
    pub operation_count: u64,
}

impl PoolEntry {
    /// Wraps a freshly initialized engine.
    #[must_use]
    pub fn new(pool_id: PoolId, engine: PoolEngine, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            pool_id,
            engine,
            name,
            created_at: now,
            last_modified_at: now,
            operation_count: 0,
        }
    }

    /// Records one successful mutation.
    pub fn touch(&mut self) {
        self.operation_count = self.operation_count.saturating_add(1);
        self.last_modified_at = Utc::now();
    }
}

/// Lightweight summary of a pool for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Optional name.
    pub name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Total capacity.
    pub capacity: Amount,
    /// Remaining availability.
    pub availability: Amount,
    /// Live positions.
    pub live_positions: usize,
    /// Successful mutations applied.
    pub operation_count: u64,
}

impl From<&PoolEntry> for PoolSummary {
    fn from(entry: &PoolEntry) -> Self {
        let details = entry.engine.details();
        Self {
            pool_id: entry.pool_id,
            name: entry.name.clone(),
            created_at: entry.created_at,
            capacity: details.capacity,
            availability: details.availability,
            live_positions: entry.engine.live_positions(),
            operation_count: entry.operation_count,
        }
    }
}
