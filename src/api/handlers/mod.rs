//! REST endpoint handlers organized by resource.

pub mod ledger;
pub mod pool;
pub mod position;
pub mod role;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pool::routes())
        .merge(ledger::routes())
        .merge(position::routes())
        .merge(role::routes())
}
