//! DTOs for the PoolOperator ledger operations: invest, withdraw, final
//! withdrawal and split.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccountId, PoolId, PositionId};

/// Request body for `POST /pools/{id}/invest`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InvestRequest {
    /// Caller correlation key, echoed in the audit record.
    pub order_ref: String,
    /// Invested amount (string-encoded u128).
    pub amount: String,
    /// Owner of the new position.
    #[schema(value_type = String)]
    pub investor: AccountId,
    /// Opaque content reference attached to the position.
    pub content_ref: String,
}

/// Response body for `POST /pools/{id}/invest`.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvestResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Id of the new position.
    #[schema(value_type = u64)]
    pub position_id: PositionId,
    /// Availability after the reservation.
    pub availability: String,
}

/// Request body for `POST /pools/{id}/withdraw`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    /// Caller correlation key.
    pub order_ref: String,
    /// Reward paid out of custody (string-encoded u128).
    pub reward_amount: String,
    /// Recipient of the reward.
    #[schema(value_type = String)]
    pub wallet: AccountId,
    /// Position the payout refers to.
    #[schema(value_type = u64)]
    pub position_id: PositionId,
}

/// Response body for `POST /pools/{id}/withdraw`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WithdrawResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Reward paid.
    pub reward_amount: String,
    /// Custody balance after the payout.
    pub custody_balance: String,
}

/// Request body for `POST /pools/{id}/final-withdrawal`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinalWithdrawalRequest {
    /// Caller correlation key.
    pub order_ref: String,
    /// Owner of the settlement position.
    #[schema(value_type = String)]
    pub wallet: AccountId,
    /// Position being settled.
    #[schema(value_type = u64)]
    pub position_id: PositionId,
    /// Content reference of the settlement position.
    pub content_ref: String,
}

/// Response body for `POST /pools/{id}/final-withdrawal`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinalWithdrawalResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Burned position.
    #[schema(value_type = u64)]
    pub settled_position_id: PositionId,
    /// Newly minted settlement position.
    #[schema(value_type = u64)]
    pub new_position_id: PositionId,
}

/// Request body for `POST /pools/{id}/split`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SplitRequest {
    /// Caller correlation key.
    pub order_ref: String,
    /// Parent position to burn.
    #[schema(value_type = u64)]
    pub position_id: PositionId,
    /// Declared value of the parent (string-encoded u128).
    pub total_amount: String,
    /// Child amounts (string-encoded u128), in mint order.
    pub amounts: Vec<String>,
    /// Child content references, one per amount.
    pub content_refs: Vec<String>,
    /// Owner of every child.
    #[schema(value_type = String)]
    pub new_owner: AccountId,
}

/// Response body for `POST /pools/{id}/split`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SplitResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Burned parent.
    #[schema(value_type = u64)]
    pub position_id: PositionId,
    /// Children, in mint order.
    #[schema(value_type = Vec<u64>)]
    pub new_position_ids: Vec<PositionId>,
}
