//! Per-connection subscription manager.
//!
//! Tracks which pool IDs a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::PoolId;

/// Wildcard accepted in `pool_ids` to match every pool.
pub const WILDCARD: &str = "*";

/// Pool selection parsed from a command's `pool_ids` list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolSelection {
    /// Explicit pool ids.
    pub ids: Vec<PoolId>,
    /// Whether `"*"` was present.
    pub wildcard: bool,
    /// Entries that were neither `"*"` nor a UUID.
    pub rejected: Vec<String>,
}

impl PoolSelection {
    /// Parses raw `pool_ids` strings.
    #[must_use]
    pub fn parse(raw: &[String]) -> Self {
        let mut selection = Self::default();
        for entry in raw {
            if entry == WILDCARD {
                selection.wildcard = true;
            } else if let Ok(uuid) = entry.parse::<uuid::Uuid>() {
                selection.ids.push(PoolId::from_uuid(uuid));
            } else {
                selection.rejected.push(entry.clone());
            }
        }
        selection
    }
}

/// Manages the set of pool subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed pool IDs. If `subscribe_all` is true, this set is ignored.
    pool_ids: HashSet<PoolId>,
    /// Whether the client subscribes to all pools (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a selection to the subscription set.
    pub fn subscribe(&mut self, selection: &PoolSelection) {
        if selection.wildcard {
            self.subscribe_all = true;
        }
        self.pool_ids.extend(selection.ids.iter().copied());
    }

    /// Removes a selection from the subscription set. A wildcard in the
    /// selection turns the wildcard subscription off.
    pub fn unsubscribe(&mut self, selection: &PoolSelection) {
        if selection.wildcard {
            self.subscribe_all = false;
        }
        for id in &selection.ids {
            self.pool_ids.remove(id);
        }
    }

    /// Returns `true` if the given pool ID matches the subscription filter.
    #[must_use]
    pub fn matches(&self, pool_id: PoolId) -> bool {
        self.subscribe_all || self.pool_ids.contains(&pool_id)
    }

    /// Returns the number of explicitly subscribed pool IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pool_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn explicit(ids: &[PoolId]) -> PoolSelection {
        PoolSelection {
            ids: ids.to_vec(),
            ..PoolSelection::default()
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(PoolId::new()));
    }

    #[test]
    fn subscribe_specific_pool() {
        let mut mgr = SubscriptionManager::new();
        let id = PoolId::new();
        mgr.subscribe(&explicit(&[id]));
        assert!(mgr.matches(id));
        assert!(!mgr.matches(PoolId::new()));
    }

    #[test]
    fn wildcard_on_and_off() {
        let mut mgr = SubscriptionManager::new();
        let all = PoolSelection::parse(&["*".to_string()]);
        mgr.subscribe(&all);
        assert!(mgr.matches(PoolId::new()));
        mgr.unsubscribe(&all);
        assert!(!mgr.matches(PoolId::new()));
    }

    #[test]
    fn unsubscribe_removes_pool() {
        let mut mgr = SubscriptionManager::new();
        let id = PoolId::new();
        mgr.subscribe(&explicit(&[id]));
        mgr.unsubscribe(&explicit(&[id]));
        assert!(!mgr.matches(id));
        assert_eq!(mgr.count(), 0);
    }

    #[test]
    fn parse_separates_rejected_entries() {
        let id = PoolId::new();
        let selection = PoolSelection::parse(&[id.to_string(), "nope".to_string()]);
        assert_eq!(selection.ids, vec![id]);
        assert!(!selection.wildcard);
        assert_eq!(selection.rejected, vec!["nope".to_string()]);
    }
}
