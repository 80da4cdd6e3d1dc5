//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{EventBus, PoolRegistry, ValueTransferAsset};
use crate::service::PoolService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pool service for all ledger operations.
    pub pool_service: Arc<PoolService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires a fresh registry and service around `asset`.
    #[must_use]
    pub fn new(asset: Arc<dyn ValueTransferAsset>, event_bus_capacity: usize) -> Self {
        let event_bus = EventBus::new(event_bus_capacity);
        let pool_service = Arc::new(PoolService::new(
            Arc::new(PoolRegistry::new()),
            event_bus.clone(),
            asset,
        ));
        Self {
            pool_service,
            event_bus,
        }
    }
}
