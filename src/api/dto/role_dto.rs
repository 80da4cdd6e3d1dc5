//! Role membership DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AccountId, PoolId, Role};

/// Response body for the `/pools/{id}/roles/{role}/{account}` endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Role queried or changed.
    pub role: Role,
    /// Account queried or changed.
    #[schema(value_type = String)]
    pub account: AccountId,
    /// Membership after the call.
    pub has_role: bool,
    /// Whether the call changed membership. Always `false` for queries.
    pub changed: bool,
}
