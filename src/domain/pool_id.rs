//! Investment pool identifier.
//!
//! [`PoolId`] wraps a UUID v4 so pool identifiers cannot be confused with
//! position ids, order references or any other UUID in the gateway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier of an investment pool.
///
/// Assigned when the pool is initialized and immutable afterwards. Keys the
/// [`super::PoolRegistry`], names the pool's custody account and scopes
/// WebSocket subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PoolId(uuid::Uuid);

impl PoolId {
    /// Creates a new random `PoolId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Wraps an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PoolId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<uuid::Uuid> for PoolId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}
