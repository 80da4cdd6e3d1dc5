//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints except `/health` are mounted under `/api/v1`. Mutating
//! endpoints act as the identity named in the `X-Caller` header.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
