//! Position handlers: safe mint, lookup, burn, transfer and owner listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    MintRequest, MintResponse, OwnedPositionsResponse, PositionResponse, TransferRequest,
};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::domain::{AccountId, PoolId, PositionId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /pools/{id}/positions`: Mint a position directly.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller lacks PoolOperator or the id is
/// already live.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/positions",
    tag = "Positions",
    summary = "Mint a position",
    description = "Mints a position to `to`, with an explicit id or the next auto-assigned one.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    request_body = MintRequest,
    responses(
        (status = 201, description = "Position minted", body = MintResponse),
        (status = 403, description = "Caller lacks PoolOperator", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Position id already in use", body = ErrorResponse),
    )
)]
pub async fn safe_mint(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<MintRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let position_id = state
        .pool_service
        .safe_mint(pool_id, &caller, req.to, req.position_id, &req.content_ref)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MintResponse {
            pool_id,
            position_id,
        }),
    ))
}

/// `GET /pools/{id}/positions/{position_id}`: Look up a live position.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool or position does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/positions/{position_id}",
    tag = "Positions",
    summary = "Get a position",
    description = "Returns the owner, content reference and provenance of a live position.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("position_id" = u64, Path, description = "Position id"),
    ),
    responses(
        (status = 200, description = "Position", body = PositionResponse),
        (status = 404, description = "Pool or position not found", body = ErrorResponse),
    )
)]
pub async fn get_position(
    State(state): State<AppState>,
    Path((id, position_id)): Path<(uuid::Uuid, u64)>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let position = state
        .pool_service
        .position(pool_id, PositionId::new(position_id))
        .await?;

    Ok(Json(PositionResponse { pool_id, position }))
}

/// `DELETE /pools/{id}/positions/{position_id}`: Burn a position.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller lacks PoolOperator or the
/// position does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/pools/{id}/positions/{position_id}",
    tag = "Positions",
    summary = "Burn a position",
    description = "Deletes a live position. Availability is not restored.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("position_id" = u64, Path, description = "Position id"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    responses(
        (status = 200, description = "Final record of the burned position", body = PositionResponse),
        (status = 403, description = "Caller lacks PoolOperator", body = ErrorResponse),
        (status = 404, description = "Pool or position not found", body = ErrorResponse),
    )
)]
pub async fn burn(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((id, position_id)): Path<(uuid::Uuid, u64)>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let position = state
        .pool_service
        .burn(pool_id, &caller, PositionId::new(position_id))
        .await?;

    Ok(Json(PositionResponse { pool_id, position }))
}

/// `POST /pools/{id}/positions/{position_id}/transfer`: Move a position.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller is not `from`, the position does
/// not exist, or `from` does not own it.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/positions/{position_id}/transfer",
    tag = "Positions",
    summary = "Transfer a position",
    description = "Moves a position from `from` to `to`. Only `from` may initiate the transfer.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("position_id" = u64, Path, description = "Position id"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Position after the transfer", body = PositionResponse),
        (status = 403, description = "Caller is not the sender or not the owner", body = ErrorResponse),
        (status = 404, description = "Pool or position not found", body = ErrorResponse),
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((id, position_id)): Path<(uuid::Uuid, u64)>,
    Json(req): Json<TransferRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let position_id = PositionId::new(position_id);
    state
        .pool_service
        .transfer(pool_id, &caller, req.from, req.to, position_id)
        .await?;
    let position = state.pool_service.position(pool_id, position_id).await?;

    Ok(Json(PositionResponse { pool_id, position }))
}

/// `GET /pools/{id}/owners/{account}/positions`: Positions of an owner.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool does not exist or the account is
/// blank.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/owners/{account}/positions",
    tag = "Positions",
    summary = "List positions of an owner",
    description = "Returns every live position held by `account`, ascending by id.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("account" = String, Path, description = "Owner identity"),
    ),
    responses(
        (status = 200, description = "Owned positions", body = OwnedPositionsResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn positions_of(
    State(state): State<AppState>,
    Path((id, account)): Path<(uuid::Uuid, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let owner = AccountId::new(&account)
        .map_err(|err| GatewayError::InvalidRequest(err.to_string()))?;
    let positions = state.pool_service.positions_of(pool_id, &owner).await?;

    Ok(Json(OwnedPositionsResponse {
        pool_id,
        owner,
        positions,
    }))
}

/// Position routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/positions", post(safe_mint))
        .route(
            "/pools/{id}/positions/{position_id}",
            get(get_position).delete(burn),
        )
        .route(
            "/pools/{id}/positions/{position_id}/transfer",
            post(transfer),
        )
        .route("/pools/{id}/owners/{account}/positions", get(positions_of))
}
