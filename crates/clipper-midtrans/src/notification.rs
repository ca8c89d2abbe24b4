//! Server-to-server notification payload.

use serde::{Deserialize, Serialize};

/// The JSON body the gateway POSTs to the webhook endpoint.
///
/// `transaction_status` is kept as the raw wire string here; the handler
/// parses it after the signature check so an unknown code is reported as a
/// validation failure on an authenticated payload, not a deserialization
/// reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionNotification {
    /// Order identifier joining the notification to a stored payment.
    pub order_id: String,
    /// Raw gateway transaction status.
    pub transaction_status: String,
    /// Optional fraud sub-status ("accept", "challenge", "deny").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_status: Option<String>,
    /// Gateway status code, part of the signed material.
    pub status_code: String,
    /// Gross amount as a decimal string, part of the signed material.
    pub gross_amount: String,
    /// hex(SHA-512) signature over order_id, status_code, gross_amount and
    /// the shared server key.
    pub signature_key: String,
}
