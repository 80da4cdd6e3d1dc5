//! Position DTOs: direct mint, transfer and lookups.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccountId, PoolId, Position, PositionId};

/// Request body for `POST /pools/{id}/positions` (safe mint).
#[derive(Debug, Deserialize, ToSchema)]
pub struct MintRequest {
    /// Owner of the new position.
    #[schema(value_type = String)]
    pub to: AccountId,
    /// Explicit id; the next auto-assigned id when omitted.
    #[serde(default)]
    #[schema(value_type = Option<u64>)]
    pub position_id: Option<PositionId>,
    /// Opaque content reference.
    pub content_ref: String,
}

/// Response body for `POST /pools/{id}/positions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MintResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Id of the minted position.
    #[schema(value_type = u64)]
    pub position_id: PositionId,
}

/// Request body for `POST /pools/{id}/positions/{position_id}/transfer`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Current owner; must equal the caller.
    #[schema(value_type = String)]
    pub from: AccountId,
    /// New owner.
    #[schema(value_type = String)]
    pub to: AccountId,
}

/// A position as exposed over REST.
#[derive(Debug, Serialize, ToSchema)]
pub struct PositionResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// The position record.
    pub position: Position,
}

/// Response body for `GET /pools/{id}/owners/{account}/positions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OwnedPositionsResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Queried owner.
    #[schema(value_type = String)]
    pub owner: AccountId,
    /// Live positions, ascending by id.
    pub positions: Vec<Position>,
}
