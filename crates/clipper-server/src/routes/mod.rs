//! API routes for the Clipper server.

pub mod payments;
pub mod webhook;

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use clipper_midtrans::GatewayClient;

use crate::pricing::PriceTable;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database pool.
    pub pool: PgPool,
    /// Gateway client, carrying endpoints and the shared server key.
    pub gateway: Arc<GatewayClient>,
    /// Injected price catalog.
    pub prices: Arc<PriceTable>,
    /// Externally-visible base URL, used for checkout callbacks.
    pub public_base_url: String,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        gateway: GatewayClient,
        prices: PriceTable,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            gateway: Arc::new(gateway),
            prices: Arc::new(prices),
            public_base_url: public_base_url.into(),
        }
    }
}

/// Creates the main API router with all routes mounted.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Creates the v1 API routes.
fn api_v1_routes(state: AppState) -> Router {
    Router::new().nest("/payments", payments::router(state))
}
