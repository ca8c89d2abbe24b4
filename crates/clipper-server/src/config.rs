//! Server configuration loaded from the environment at startup.

use anyhow::Context;
use clipper_midtrans::GatewayConfig;

/// Default bind address when `CLIPPER_BIND_ADDR` is not set.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default externally-visible base URL, used to build the checkout finish
/// redirect and the webhook notification URL.
const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";

/// Complete server configuration.
///
/// Everything is resolved here, once, at startup; request handlers receive
/// explicit values and never read the environment themselves.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Externally-visible base URL of this deployment (no trailing slash).
    pub public_base_url: String,
    /// Gateway endpoints and credentials.
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`, `MIDTRANS_SERVER_KEY`.
    /// Optional: `MIDTRANS_ENV` ("production" or "sandbox", default sandbox),
    /// `CLIPPER_BIND_ADDR`, `CLIPPER_PUBLIC_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let server_key =
            std::env::var("MIDTRANS_SERVER_KEY").context("MIDTRANS_SERVER_KEY must be set")?;

        let gateway = match std::env::var("MIDTRANS_ENV").as_deref() {
            Ok("production") => GatewayConfig::production(server_key),
            Ok("sandbox") | Err(_) => GatewayConfig::sandbox(server_key),
            Ok(other) => {
                anyhow::bail!("MIDTRANS_ENV must be 'production' or 'sandbox', got '{other}'")
            }
        };

        let bind_addr = std::env::var("CLIPPER_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let public_base_url = std::env::var("CLIPPER_PUBLIC_URL")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url,
            bind_addr,
            public_base_url,
            gateway,
        })
    }
}
