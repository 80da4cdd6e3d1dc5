//! pyse-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pyse_gateway::api;
use pyse_gateway::app_state::AppState;
use pyse_gateway::config::{GatewayConfig, LogFormat};
use pyse_gateway::domain::InMemoryAsset;
use pyse_gateway::ws::handler::ws_handler;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting pyse-gateway");

    // External asset, seeded with the treasury supply
    let asset = Arc::new(InMemoryAsset::with_supply(
        config.asset_treasury.clone(),
        config.asset_treasury_supply,
    ));
    tracing::info!(
        treasury = %config.asset_treasury,
        supply = %config.asset_treasury_supply,
        "asset ledger seeded"
    );

    let app_state = AppState::new(asset, config.event_bus_capacity);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler));
    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::openapi::ApiDoc::openapi()),
        )
    };
    let app = app
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}
