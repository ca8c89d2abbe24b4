//! Async HTTP client for the gateway's Snap checkout and status endpoints.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Bounded timeout for every outbound gateway call. A hung call is surfaced
/// as a transient error; the webhook will be redelivered and the pull sync
/// retries on the next page view.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com/snap/v1";
const PRODUCTION_STATUS_URL: &str = "https://api.midtrans.com/v2";
const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com/snap/v1";
const SANDBOX_STATUS_URL: &str = "https://api.sandbox.midtrans.com/v2";

/// Explicit gateway configuration.
///
/// Endpoint selection is a constructor argument, not an ambient environment
/// read, so tests can point the client at a local stand-in.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the Snap checkout API (no trailing slash).
    pub snap_base_url: String,
    /// Base URL of the transaction status API (no trailing slash).
    pub status_base_url: String,
    /// Shared server key; authenticates outbound calls and inbound webhooks.
    pub server_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Configuration for the live gateway.
    pub fn production(server_key: impl Into<String>) -> Self {
        Self {
            snap_base_url: PRODUCTION_SNAP_URL.to_string(),
            status_base_url: PRODUCTION_STATUS_URL.to_string(),
            server_key: server_key.into(),
            timeout: GATEWAY_TIMEOUT,
        }
    }

    /// Configuration for the gateway sandbox.
    pub fn sandbox(server_key: impl Into<String>) -> Self {
        Self {
            snap_base_url: SANDBOX_SNAP_URL.to_string(),
            status_base_url: SANDBOX_STATUS_URL.to_string(),
            server_key: server_key.into(),
            timeout: GATEWAY_TIMEOUT,
        }
    }
}

/// Transaction identity and amount for a Snap checkout request.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutTransaction {
    pub order_id: String,
    pub gross_amount: i64,
}

/// A single line item shown on the hosted checkout page.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutItem {
    pub id: String,
    pub price: i64,
    pub quantity: u32,
    pub name: String,
}

/// Customer identity forwarded to the hosted checkout page.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutCustomer {
    pub email: String,
    pub first_name: String,
}

/// Redirect target after the customer finishes (or abandons) checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutCallbacks {
    pub finish: String,
}

/// Full Snap checkout creation request.
#[derive(Debug, Clone, Serialize)]
pub struct SnapCheckoutRequest {
    pub transaction_details: CheckoutTransaction,
    pub item_details: Vec<CheckoutItem>,
    pub customer_details: CheckoutCustomer,
    pub callbacks: CheckoutCallbacks,
    /// Payment channels offered on the hosted page.
    pub enabled_payments: Vec<String>,
    /// Webhook endpoint the gateway notifies about status changes.
    pub notification_url: String,
}

/// Payment channels offered on the hosted checkout page.
pub fn default_enabled_payments() -> Vec<String> {
    [
        "credit_card",
        "bca_va",
        "bni_va",
        "bri_va",
        "permata_va",
        "other_va",
        "gopay",
        "shopeepay",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Response to a Snap checkout creation.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapTransaction {
    /// Hosted checkout page the customer is redirected to.
    pub redirect_url: String,
    /// Snap token, unused by this service but returned by the gateway.
    #[serde(default)]
    pub token: Option<String>,
}

/// Raw wire response to a status lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionStatusResponse {
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

/// Async client for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Builds a client with the configured timeout applied to every call.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// The shared server key, used by the webhook signature check.
    pub fn server_key(&self) -> &str {
        &self.config.server_key
    }

    /// HTTP Basic authorization header value: base64("server_key:").
    fn auth_header(&self) -> String {
        format!(
            "Basic {}",
            BASE64_STANDARD.encode(format!("{}:", self.config.server_key))
        )
    }

    /// Creates a hosted checkout transaction and returns the redirect link.
    pub async fn create_transaction(
        &self,
        request: &SnapCheckoutRequest,
    ) -> Result<SnapTransaction, GatewayError> {
        let url = format!("{}/transactions", self.config.snap_base_url);
        tracing::debug!(
            order_id = %request.transaction_details.order_id,
            gross_amount = request.transaction_details.gross_amount,
            "creating gateway checkout transaction"
        );

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, body });
        }

        let transaction: SnapTransaction = response.json().await?;
        if transaction.redirect_url.is_empty() {
            return Err(GatewayError::MissingRedirectUrl);
        }

        Ok(transaction)
    }

    /// Looks up the gateway's authoritative status for an order.
    pub async fn transaction_status(
        &self,
        order_id: &str,
    ) -> Result<TransactionStatusResponse, GatewayError> {
        let url = format!("{}/{}/status", self.config.status_base_url, order_id);
        tracing::debug!(order_id, "querying gateway transaction status");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_constructors() {
        let prod = GatewayConfig::production("key");
        assert_eq!(prod.snap_base_url, "https://app.midtrans.com/snap/v1");
        assert_eq!(prod.status_base_url, "https://api.midtrans.com/v2");

        let sandbox = GatewayConfig::sandbox("key");
        assert_eq!(
            sandbox.snap_base_url,
            "https://app.sandbox.midtrans.com/snap/v1"
        );
        assert_eq!(
            sandbox.status_base_url,
            "https://api.sandbox.midtrans.com/v2"
        );
        assert_eq!(sandbox.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_auth_header_encodes_key_with_trailing_colon() {
        let client = GatewayClient::new(GatewayConfig::sandbox("SB-Mid-server-abc")).unwrap();
        // base64("SB-Mid-server-abc:")
        assert_eq!(client.auth_header(), "Basic U0ItTWlkLXNlcnZlci1hYmM6");
    }

    #[test]
    fn test_checkout_request_wire_shape() {
        let request = SnapCheckoutRequest {
            transaction_details: CheckoutTransaction {
                order_id: "clipper-small-1722950400000-9f86d0".to_string(),
                gross_amount: 150_000,
            },
            item_details: vec![CheckoutItem {
                id: "small".to_string(),
                price: 150_000,
                quantity: 1,
                name: "Small Credit Pack (50)".to_string(),
            }],
            customer_details: CheckoutCustomer {
                email: "user@example.com".to_string(),
                first_name: "user".to_string(),
            },
            callbacks: CheckoutCallbacks {
                finish: "https://clipper.example/dashboard?payment=finished".to_string(),
            },
            enabled_payments: default_enabled_payments(),
            notification_url: "https://clipper.example/api/v1/payments/webhook/midtrans"
                .to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["transaction_details"]["order_id"],
            "clipper-small-1722950400000-9f86d0"
        );
        assert_eq!(value["transaction_details"]["gross_amount"], 150_000);
        assert_eq!(value["item_details"][0]["quantity"], 1);
        assert_eq!(value["enabled_payments"][0], "credit_card");
        assert!(value["notification_url"]
            .as_str()
            .unwrap()
            .ends_with("/webhook/midtrans"));
    }

    #[test]
    fn test_status_response_parses_without_fraud_status() {
        let body = r#"{"transaction_status": "settlement"}"#;
        let parsed: TransactionStatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.transaction_status, "settlement");
        assert_eq!(parsed.fraud_status, None);
    }
}
