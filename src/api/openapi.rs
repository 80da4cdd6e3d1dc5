//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto;
use super::handlers::{ledger, pool, position, role, system};
use crate::domain::{ErrorKind, PoolDetails, PoolId, Position, PositionId, Provenance, Role};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description of every `/api/v1` route.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "pyse-gateway",
        description = "Investment-pool ledger: pools, positions and role-gated operations."
    ),
    paths(
        system::health_handler,
        pool::create_pool,
        pool::list_pools,
        pool::get_pool,
        pool::delete_pool,
        pool::update_minimum_ticket,
        pool::get_custody,
        pool::deposit,
        ledger::invest,
        ledger::withdraw,
        ledger::final_withdrawal,
        ledger::split,
        position::safe_mint,
        position::get_position,
        position::burn,
        position::transfer,
        position::positions_of,
        role::has_role,
        role::grant_role,
        role::revoke_role,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        ErrorKind,
        PoolId,
        PositionId,
        PoolDetails,
        Position,
        Provenance,
        Role,
        dto::PaginationMeta,
        dto::CreatePoolRequest,
        dto::CreatePoolResponse,
        dto::PoolDetailResponse,
        dto::PoolSummaryDto,
        dto::PoolListResponse,
        dto::MinimumTicketRequest,
        dto::MinimumTicketResponse,
        dto::DepositRequest,
        dto::CustodyResponse,
        dto::InvestRequest,
        dto::InvestResponse,
        dto::WithdrawRequest,
        dto::WithdrawResponse,
        dto::FinalWithdrawalRequest,
        dto::FinalWithdrawalResponse,
        dto::SplitRequest,
        dto::SplitResponse,
        dto::MintRequest,
        dto::MintResponse,
        dto::TransferRequest,
        dto::PositionResponse,
        dto::OwnedPositionsResponse,
        dto::RoleResponse,
    )),
    tags(
        (name = "System", description = "Service health"),
        (name = "Pools", description = "Pool lifecycle, terms and custody"),
        (name = "Ledger", description = "PoolOperator investment operations"),
        (name = "Positions", description = "Position minting, lookup and transfer"),
        (name = "Roles", description = "Administrator and PoolOperator membership"),
    )
)]
pub struct ApiDoc;
