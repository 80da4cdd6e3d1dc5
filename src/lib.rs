//! # pyse-gateway
//!
//! Investment-pool ledger with REST and WebSocket surfaces.
//!
//! Each pool tracks a fixed capacity and the availability left to invest,
//! issues non-fungible positions to investors, and lets them be split,
//! transferred, burned and settled. Every mutation is gated by a role
//! (Administrator or PoolOperator) and emits an audit record. Reward
//! payouts move funds of an external asset out of the pool's custody
//! account.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Audit Stream (ws/)
//!     │
//!     ├── PoolService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── PoolRegistry (domain/)
//!     └── PoolEngine (domain/)
//!           ├── RoleAuthority
//!           ├── PositionRegistry
//!           ├── PoolAccount
//!           └── ValueTransferAsset
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
