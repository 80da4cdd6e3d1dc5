//! PoolOperator ledger handlers: invest, withdraw, final withdrawal, split.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    FinalWithdrawalRequest, FinalWithdrawalResponse, InvestRequest, InvestResponse, SplitRequest,
    SplitResponse, WithdrawRequest, WithdrawResponse, amount_field,
};
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::SplitOrder;

/// `POST /pools/{id}/invest`: Reserve availability and issue a position.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller lacks PoolOperator or the amount
/// exceeds availability.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/invest",
    tag = "Ledger",
    summary = "Invest",
    description = "Reduces availability by `amount` and mints a position to `investor`.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    request_body = InvestRequest,
    responses(
        (status = 200, description = "Investment recorded", body = InvestResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller lacks PoolOperator", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Capacity exceeded", body = ErrorResponse),
    )
)]
pub async fn invest(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<InvestRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let amount = amount_field("amount", &req.amount)?;

    let position_id = state
        .pool_service
        .invest(pool_id, &caller, &req.order_ref, amount, req.investor, &req.content_ref)
        .await?;
    let details = state.pool_service.pool_details(pool_id).await?;

    Ok(Json(InvestResponse {
        pool_id,
        position_id,
        availability: details.availability.to_string(),
    }))
}

/// `POST /pools/{id}/withdraw`: Pay a reward out of custody.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller lacks PoolOperator or custody
/// cannot cover the reward.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/withdraw",
    tag = "Ledger",
    summary = "Withdraw reward",
    description = "Transfers `reward_amount` of the external asset from pool custody to `wallet`. Positions are not changed.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Reward paid", body = WithdrawResponse),
        (status = 403, description = "Caller lacks PoolOperator", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Insufficient custody funds", body = ErrorResponse),
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<WithdrawRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let reward_amount = amount_field("reward_amount", &req.reward_amount)?;

    let custody_balance = state
        .pool_service
        .withdraw(
            pool_id,
            &caller,
            &req.order_ref,
            reward_amount,
            req.wallet,
            req.position_id,
        )
        .await?;

    Ok(Json(WithdrawResponse {
        pool_id,
        reward_amount: reward_amount.to_string(),
        custody_balance: custody_balance.to_string(),
    }))
}

/// `POST /pools/{id}/final-withdrawal`: Settle a position.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller lacks PoolOperator or the
/// position does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/final-withdrawal",
    tag = "Ledger",
    summary = "Final withdrawal",
    description = "Burns the position and mints a settlement position to `wallet`.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    request_body = FinalWithdrawalRequest,
    responses(
        (status = 200, description = "Position settled", body = FinalWithdrawalResponse),
        (status = 403, description = "Caller lacks PoolOperator", body = ErrorResponse),
        (status = 404, description = "Pool or position not found", body = ErrorResponse),
    )
)]
pub async fn final_withdrawal(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<FinalWithdrawalRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let new_position_id = state
        .pool_service
        .final_withdrawal(
            pool_id,
            &caller,
            &req.order_ref,
            req.wallet,
            req.position_id,
            &req.content_ref,
        )
        .await?;

    Ok(Json(FinalWithdrawalResponse {
        pool_id,
        settled_position_id: req.position_id,
        new_position_id,
    }))
}

/// `POST /pools/{id}/split`: Split a position into children.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller lacks PoolOperator, a child is
/// below the minimum ticket, the amounts do not add up, or the position
/// does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/split",
    tag = "Ledger",
    summary = "Split a position",
    description = "Burns the parent and mints one child per amount to `new_owner`. Each child must meet the minimum ticket and the children must add up to `total_amount`.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    request_body = SplitRequest,
    responses(
        (status = 200, description = "Position split", body = SplitResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller lacks PoolOperator", body = ErrorResponse),
        (status = 404, description = "Pool or position not found", body = ErrorResponse),
        (status = 422, description = "Below minimum ticket or amount mismatch", body = ErrorResponse),
    )
)]
pub async fn split(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SplitRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let total_amount = amount_field("total_amount", &req.total_amount)?;
    let amounts = req
        .amounts
        .iter()
        .map(|raw| amount_field("amounts", raw))
        .collect::<Result<Vec<_>, _>>()?;

    let order = SplitOrder {
        order_ref: req.order_ref,
        position_id: req.position_id,
        total_amount,
        amounts,
        content_refs: req.content_refs,
        new_owner: req.new_owner,
    };
    let new_position_ids = state.pool_service.split(pool_id, &caller, order).await?;

    Ok(Json(SplitResponse {
        pool_id,
        position_id: req.position_id,
        new_position_ids,
    }))
}

/// Ledger operation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/invest", post(invest))
        .route("/pools/{id}/withdraw", post(withdraw))
        .route("/pools/{id}/final-withdrawal", post(final_withdrawal))
        .route("/pools/{id}/split", post(split))
}
