//! Pool-related DTOs for create, get, list and pool-level settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::pool_entry::PoolSummary;
use crate::domain::{AccountId, PoolDetails, PoolId};

/// Request body for `POST /pools`.
///
/// The caller named in `X-Caller` becomes the pool's Administrator.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePoolRequest {
    /// Optional human-readable name (max 100 chars).
    #[serde(default)]
    pub name: Option<String>,
    /// Account granted PoolOperator.
    #[schema(value_type = String)]
    pub operator: AccountId,
    /// Total investable amount (string-encoded u128).
    pub capacity: String,
    /// Reward rate, stored and reported only.
    pub rate: u64,
    /// Investment window start (epoch milliseconds).
    pub window_start: u64,
    /// Investment window end (epoch milliseconds).
    pub window_end: u64,
    /// Smallest amount a split child may carry (string-encoded u128).
    pub minimum_ticket: String,
}

/// Response body for `POST /pools` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePoolResponse {
    /// Unique pool identifier.
    pub pool_id: PoolId,
    /// Pool name echoed from request.
    pub name: Option<String>,
    /// Account custodying the pool's reward funds.
    #[schema(value_type = String)]
    pub custody_account: AccountId,
    /// Initial pool details.
    pub details: PoolDetails,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Response body for `GET /pools/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolDetailResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Optional name.
    pub name: Option<String>,
    /// `checkPoolDetails` values.
    pub details: PoolDetails,
    /// Live position count.
    pub live_positions: usize,
    /// Successful mutations applied.
    pub operation_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Pool summary for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolSummaryDto {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Optional name.
    pub name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Total capacity.
    pub capacity: String,
    /// Remaining availability.
    pub availability: String,
    /// Live position count.
    pub live_positions: usize,
    /// Successful mutations applied.
    pub operation_count: u64,
}

impl From<PoolSummary> for PoolSummaryDto {
    fn from(summary: PoolSummary) -> Self {
        Self {
            pool_id: summary.pool_id,
            name: summary.name,
            created_at: summary.created_at,
            capacity: summary.capacity.to_string(),
            availability: summary.availability.to_string(),
            live_positions: summary.live_positions,
            operation_count: summary.operation_count,
        }
    }
}

/// Paginated list response for `GET /pools`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Pool summaries.
    pub data: Vec<PoolSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for `POST /pools/{id}/minimum-ticket`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MinimumTicketRequest {
    /// New minimum ticket (string-encoded u128).
    pub minimum_ticket: String,
}

/// Response body for `POST /pools/{id}/minimum-ticket`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MinimumTicketResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Value before the update.
    pub previous: String,
    /// Value now in force.
    pub minimum_ticket: String,
}

/// Request body for `POST /pools/{id}/custody/deposit`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositRequest {
    /// Amount moved from the caller into custody (string-encoded u128).
    pub amount: String,
}

/// Response body for custody endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustodyResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Account custodying the pool's reward funds.
    #[schema(value_type = String)]
    pub custody_account: AccountId,
    /// Current custody balance.
    pub balance: String,
}
