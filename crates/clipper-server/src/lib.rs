//! Clipper Server - billing and payment API
//!
//! This crate provides the REST API for Clipper's credit top-up flow:
//! checkout initiation against the payment gateway, webhook and pull-based
//! payment reconciliation, and billing queries.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pricing;
pub mod reconcile;
pub mod routes;

pub use config::AppConfig;
pub use error::AppError;
pub use routes::{create_router, AppState};

/// Installs the global tracing subscriber, honoring `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
