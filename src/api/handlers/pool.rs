//! Pool handlers: create, list, get, delete, minimum ticket and custody.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CreatePoolRequest, CreatePoolResponse, CustodyResponse, DepositRequest, MinimumTicketRequest,
    MinimumTicketResponse, PaginationParams, PoolDetailResponse, PoolListResponse,
    PoolSummaryDto, amount_field,
};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::domain::{AccountId, PoolId, PoolTerms};
use crate::error::{ErrorResponse, GatewayError};

/// Longest accepted pool name.
const MAX_NAME_LEN: usize = 100;

/// `POST /pools`: Initialize a new pool.
///
/// # Errors
///
/// Returns [`GatewayError`] on malformed amounts, an over-long name, or an
/// inverted investment window.
#[utoipa::path(
    post,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "Create a pool",
    description = "Initializes a pool with its terms. The caller becomes Administrator and `operator` receives PoolOperator.",
    params(("X-Caller" = String, Header, description = "Acting identity")),
    request_body = CreatePoolRequest,
    responses(
        (status = 201, description = "Pool created", body = CreatePoolResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_pool(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<CreatePoolRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.name.as_ref().is_some_and(|name| name.len() > MAX_NAME_LEN) {
        return Err(GatewayError::InvalidRequest(format!(
            "name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    let terms = PoolTerms {
        capacity: amount_field("capacity", &req.capacity)?,
        rate: req.rate,
        window_start: req.window_start,
        window_end: req.window_end,
        minimum_ticket: amount_field("minimum_ticket", &req.minimum_ticket)?,
    };

    let pool_id = state
        .pool_service
        .create_pool(caller, req.operator, terms, req.name.clone())
        .await?;
    let details = state.pool_service.pool_details(pool_id).await?;

    let response = CreatePoolResponse {
        pool_id,
        name: req.name,
        custody_account: AccountId::custody(pool_id),
        details,
        created_at: Utc::now(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /pools`: List all pools with pagination.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List pools",
    description = "Returns a paginated list of all pools ordered by creation time.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated pool list", body = PoolListResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let summaries = state.pool_service.list_pools().await;
    let (page, pagination) = params.paginate(summaries);

    Ok(Json(PoolListResponse {
        data: page.into_iter().map(PoolSummaryDto::from).collect(),
        pagination,
    }))
}

/// `GET /pools/{id}`: `checkPoolDetails` plus gateway metadata.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Get pool details",
    description = "Returns capacity, availability, rate, investment window and minimum ticket for a pool.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 200, description = "Pool details", body = PoolDetailResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let entry_lock = state.pool_service.registry().get(pool_id).await?;
    let entry = entry_lock.read().await;

    let response = PoolDetailResponse {
        pool_id: entry.pool_id,
        name: entry.name.clone(),
        details: entry.engine.details(),
        live_positions: entry.engine.live_positions(),
        operation_count: entry.operation_count,
        created_at: entry.created_at,
        updated_at: entry.last_modified_at,
    };

    Ok(Json(response))
}

/// `DELETE /pools/{id}`: Remove a pool.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool does not exist or the caller is not
/// an Administrator.
#[utoipa::path(
    delete,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Delete a pool",
    description = "Removes a pool and emits a PoolRemovedEvent. Requires Administrator.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    responses(
        (status = 204, description = "Pool deleted"),
        (status = 403, description = "Caller is not an Administrator", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn delete_pool(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    state.pool_service.remove_pool(pool_id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /pools/{id}/minimum-ticket`: Replace the minimum ticket.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool does not exist or the caller lacks
/// PoolOperator.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/minimum-ticket",
    tag = "Pools",
    summary = "Update minimum ticket",
    description = "Replaces the minimum ticket used by later splits. Existing positions are unaffected.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    request_body = MinimumTicketRequest,
    responses(
        (status = 200, description = "Minimum ticket updated", body = MinimumTicketResponse),
        (status = 403, description = "Caller lacks PoolOperator", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn update_minimum_ticket(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<MinimumTicketRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let minimum_ticket = amount_field("minimum_ticket", &req.minimum_ticket)?;

    let previous = state
        .pool_service
        .update_minimum_ticket(pool_id, &caller, minimum_ticket)
        .await?;

    Ok(Json(MinimumTicketResponse {
        pool_id,
        previous: previous.to_string(),
        minimum_ticket: minimum_ticket.to_string(),
    }))
}

/// `GET /pools/{id}/custody`: Custody balance on the external asset.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool does not exist or the asset cannot
/// be queried.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/custody",
    tag = "Pools",
    summary = "Get custody balance",
    description = "Returns the pool's custody account and its balance of the external asset.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 200, description = "Custody balance", body = CustodyResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_custody(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let balance = state.pool_service.custody_balance(pool_id).await?;

    Ok(Json(CustodyResponse {
        pool_id,
        custody_account: AccountId::custody(pool_id),
        balance: balance.to_string(),
    }))
}

/// `POST /pools/{id}/custody/deposit`: Fund custody from the caller.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool does not exist or the caller's
/// asset balance is too low.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/custody/deposit",
    tag = "Pools",
    summary = "Deposit into custody",
    description = "Moves asset funds from the caller into the pool's custody account so rewards can be paid.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    request_body = DepositRequest,
    responses(
        (status = 200, description = "Deposit applied", body = CustodyResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Insufficient funds", body = ErrorResponse),
    )
)]
pub async fn deposit(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<DepositRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let amount = amount_field("amount", &req.amount)?;
    let balance = state.pool_service.deposit(pool_id, &caller, amount).await?;

    Ok(Json(CustodyResponse {
        pool_id,
        custody_account: AccountId::custody(pool_id),
        balance: balance.to_string(),
    }))
}

/// Pool management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", post(create_pool).get(list_pools))
        .route("/pools/{id}", get(get_pool).delete(delete_pool))
        .route("/pools/{id}/minimum-ticket", post(update_minimum_ticket))
        .route("/pools/{id}/custody", get(get_custody))
        .route("/pools/{id}/custody/deposit", post(deposit))
}
