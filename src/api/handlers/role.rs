//! Role membership handlers: query, grant and revoke.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::RoleResponse;
use crate::api::extract::Caller;
use crate::app_state::AppState;
use crate::domain::{AccountId, PoolId, Role};
use crate::error::{ErrorResponse, GatewayError};

/// Parses the `{role}` and `{account}` path segments.
fn parse_membership(role: &str, account: &str) -> Result<(Role, AccountId), GatewayError> {
    let role = role
        .parse::<Role>()
        .map_err(|err| GatewayError::InvalidRequest(err.to_string()))?;
    let account =
        AccountId::new(account).map_err(|err| GatewayError::InvalidRequest(err.to_string()))?;
    Ok((role, account))
}

/// `GET /pools/{id}/roles/{role}/{account}`: `hasRole`.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool does not exist or the role name is
/// unknown.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/roles/{role}/{account}",
    tag = "Roles",
    summary = "Check role membership",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("role" = String, Path, description = "`administrator` or `pool_operator`"),
        ("account" = String, Path, description = "Account identity"),
    ),
    responses(
        (status = 200, description = "Membership", body = RoleResponse),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn has_role(
    State(state): State<AppState>,
    Path((id, role, account)): Path<(uuid::Uuid, String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let (role, account) = parse_membership(&role, &account)?;
    let has_role = state.pool_service.has_role(pool_id, role, &account).await?;

    Ok(Json(RoleResponse {
        pool_id,
        role,
        account,
        has_role,
        changed: false,
    }))
}

/// `PUT /pools/{id}/roles/{role}/{account}`: Grant a role.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool does not exist or the caller is not
/// an Administrator.
#[utoipa::path(
    put,
    path = "/api/v1/pools/{id}/roles/{role}/{account}",
    tag = "Roles",
    summary = "Grant a role",
    description = "Adds `account` to the role. Granting a role already held changes nothing and emits no event.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("role" = String, Path, description = "`administrator` or `pool_operator`"),
        ("account" = String, Path, description = "Account identity"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    responses(
        (status = 200, description = "Membership after the grant", body = RoleResponse),
        (status = 403, description = "Caller is not an Administrator", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn grant_role(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((id, role, account)): Path<(uuid::Uuid, String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let (role, account) = parse_membership(&role, &account)?;
    let changed = state
        .pool_service
        .grant_role(pool_id, &caller, role, account.clone())
        .await?;

    Ok(Json(RoleResponse {
        pool_id,
        role,
        account,
        has_role: true,
        changed,
    }))
}

/// `DELETE /pools/{id}/roles/{role}/{account}`: Revoke a role.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool does not exist or the caller is not
/// an Administrator.
#[utoipa::path(
    delete,
    path = "/api/v1/pools/{id}/roles/{role}/{account}",
    tag = "Roles",
    summary = "Revoke a role",
    description = "Removes `account` from the role. Revoking a role not held changes nothing and emits no event.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("role" = String, Path, description = "`administrator` or `pool_operator`"),
        ("account" = String, Path, description = "Account identity"),
        ("X-Caller" = String, Header, description = "Acting identity"),
    ),
    responses(
        (status = 200, description = "Membership after the revocation", body = RoleResponse),
        (status = 403, description = "Caller is not an Administrator", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn revoke_role(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((id, role, account)): Path<(uuid::Uuid, String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let (role, account) = parse_membership(&role, &account)?;
    let changed = state
        .pool_service
        .revoke_role(pool_id, &caller, role, account.clone())
        .await?;

    Ok(Json(RoleResponse {
        pool_id,
        role,
        account,
        has_role: false,
        changed,
    }))
}

/// Role routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/pools/{id}/roles/{role}/{account}",
        get(has_role).put(grant_role).delete(revoke_role),
    )
}
