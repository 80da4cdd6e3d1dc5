//! Service layer: ledger orchestration.
//!
//! [`PoolService`] routes every call to the right pool's engine under that
//! pool's lock and publishes the resulting audit records through the
//! [`super::domain::EventBus`].

pub mod pool_service;

pub use pool_service::{PoolService, SplitOrder};
