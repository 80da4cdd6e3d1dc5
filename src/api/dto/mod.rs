//! Data Transfer Objects for REST request/response serialization.
//!
//! All amounts are serialized as JSON strings to prevent precision loss on
//! u128 values.

pub mod common_dto;
pub mod ledger_dto;
pub mod pool_dto;
pub mod position_dto;
pub mod role_dto;

pub use common_dto::*;
pub use ledger_dto::*;
pub use pool_dto::*;
pub use position_dto::*;
pub use role_dto::*;
