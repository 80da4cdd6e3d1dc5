//! Concurrent pool storage with per-pool exclusive locking.
//!
//! [`PoolRegistry`] stores every pool in a `HashMap` where each entry sits
//! behind its own [`tokio::sync::RwLock`]. Holding an entry's write guard
//! for the duration of one engine call is what serializes mutations of a
//! pool; different pools proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::PoolId;
use super::pool_entry::{PoolEntry, PoolSummary};
use crate::error::GatewayError;

/// Central store for all active pools.
///
/// # Concurrency
///
/// - Reads of the same pool may run concurrently.
/// - Writes to different pools run concurrently.
/// - Writes to the same pool are serialized, one engine call at a time.
#[derive(Debug)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<PoolId, Arc<RwLock<PoolEntry>>>>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new pool entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the id is already taken.
    pub async fn insert(&self, entry: PoolEntry) -> Result<PoolId, GatewayError> {
        let pool_id = entry.pool_id;
        let mut map = self.pools.write().await;
        if map.contains_key(&pool_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "pool {pool_id} already exists"
            )));
        }
        map.insert(pool_id, Arc::new(RwLock::new(entry)));
        Ok(pool_id)
    }

    /// Returns the lock guarding a pool entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if no such pool exists.
    pub async fn get(&self, pool_id: PoolId) -> Result<Arc<RwLock<PoolEntry>>, GatewayError> {
        let map = self.pools.read().await;
        map.get(&pool_id)
            .map(Arc::clone)
            .ok_or(GatewayError::PoolNotFound(*pool_id.as_uuid()))
    }

    /// Removes a pool, returning its lock. In-flight holders of the lock
    /// finish their call; no new call can reach the pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if no such pool exists.
    pub async fn remove(&self, pool_id: PoolId) -> Result<Arc<RwLock<PoolEntry>>, GatewayError> {
        let mut map = self.pools.write().await;
        map.remove(&pool_id)
            .ok_or(GatewayError::PoolNotFound(*pool_id.as_uuid()))
    }

    /// Returns summaries of all pools, oldest first.
    pub async fn list(&self) -> Vec<PoolSummary> {
        let map = self.pools.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            summaries.push(PoolSummary::from(&*entry));
        }
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    /// Returns the number of pools in the registry.
    pub async fn len(&self) -> usize {
        self.pools.read().await.len()
    }

    /// Returns `true` if the registry contains no pools.
    pub async fn is_empty(&self) -> bool {
        self.pools.read().await.is_empty()
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::pool_account::tests::scenario_terms;
    use crate::domain::{AccountId, InMemoryAsset, PoolEngine};

    fn make_pool_entry() -> PoolEntry {
        let (Ok(admin), Ok(operator)) = (AccountId::new("0xowner"), AccountId::new("0xmanager"))
        else {
            panic!("valid identities");
        };
        let pool_id = PoolId::new();
        let Ok(receipt) = PoolEngine::initialize(
            admin,
            operator,
            scenario_terms(),
            Arc::new(InMemoryAsset::default()),
            AccountId::custody(pool_id),
        ) else {
            panic!("valid terms");
        };
        PoolEntry::new(pool_id, receipt.value, Some("seed".to_string()))
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = PoolRegistry::new();
        let entry = make_pool_entry();
        let id = entry.pool_id;

        let Ok(inserted) = registry.insert(entry).await else {
            panic!("insert failed");
        };
        assert_eq!(inserted, id);
        assert!(registry.get(id).await.is_ok());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = PoolRegistry::new();
        let result = registry.get(PoolId::new()).await;
        assert!(matches!(result, Err(GatewayError::PoolNotFound(_))));
    }

    #[tokio::test]
    async fn remove_makes_pool_unreachable() {
        let registry = PoolRegistry::new();
        let entry = make_pool_entry();
        let id = entry.pool_id;

        let _ = registry.insert(entry).await;
        assert!(registry.remove(id).await.is_ok());
        assert!(registry.get(id).await.is_err());
        assert!(registry.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn list_returns_all() {
        let registry = PoolRegistry::new();
        let _ = registry.insert(make_pool_entry()).await;
        let _ = registry.insert(make_pool_entry()).await;

        let list = registry.list().await;
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|s| s.availability == 400_000_000_000));
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = PoolRegistry::new();
        assert!(registry.is_empty().await);
        let _ = registry.insert(make_pool_entry()).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
    }
}
