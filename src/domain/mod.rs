//! Domain layer: the pool ledger, its components, and the event system.
//!
//! The ledger core is [`PoolEngine`], composed of [`RoleAuthority`],
//! [`PositionRegistry`] and [`PoolAccount`] plus a handle to the external
//! [`ValueTransferAsset`]. Around it sit the gateway types: the
//! [`PoolRegistry`] of engines, [`PoolEvent`] envelopes and the
//! [`EventBus`].

pub mod account_id;
pub mod amount;
pub mod custody;
pub mod event_bus;
pub mod ledger_error;
pub mod ledger_event;
pub mod pool_account;
pub mod pool_engine;
pub mod pool_entry;
pub mod pool_event;
pub mod pool_id;
pub mod pool_registry;
pub mod position;
pub mod position_registry;
pub mod roles;

pub use account_id::{AccountId, InvalidAccountId};
pub use amount::Amount;
pub use custody::{AssetError, InMemoryAsset, ValueTransferAsset};
pub use event_bus::EventBus;
pub use ledger_error::{ErrorKind, LedgerError};
pub use ledger_event::LedgerEvent;
pub use pool_account::{PoolAccount, PoolDetails, PoolTerms};
pub use pool_engine::{PoolEngine, Receipt};
pub use pool_entry::PoolEntry;
pub use pool_event::PoolEvent;
pub use pool_id::PoolId;
pub use pool_registry::PoolRegistry;
pub use position::{Position, PositionId, Provenance};
pub use position_registry::PositionRegistry;
pub use roles::{Role, RoleAuthority};
