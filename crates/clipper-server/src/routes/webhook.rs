//! Inbound gateway notification handling (the push path).

use axum::{extract::State, Json};
use serde::Serialize;

use clipper_midtrans::{verify_notification_signature, TransactionNotification};

use crate::error::AppError;
use crate::models::{Payment, PaymentStatus};
use crate::reconcile::{apply_status, normalize_raw_status, ApplyOutcome};
use crate::routes::AppState;

/// Response body for a processed notification.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Human-readable processing outcome.
    pub message: String,
    /// The status that was applied, when one was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

/// POST /api/v1/payments/webhook/midtrans
///
/// Accepts a server-to-server status notification from the gateway:
/// 1. Recomputes the signature and rejects mismatches with 401
/// 2. Looks up the payment by order id (404 for unknown orders, which is
///    routine for the gateway's test and replay traffic, never fatal)
/// 3. Normalizes the raw status
/// 4. Short-circuits when nothing changed, otherwise applies the atomic
///    status-plus-credit update
async fn process_notification(
    state: &AppState,
    notification: &TransactionNotification,
) -> Result<WebhookResponse, AppError> {
    // Step 1: Authenticate before touching any state
    let authentic = verify_notification_signature(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        state.gateway.server_key(),
        &notification.signature_key,
    );
    if !authentic {
        tracing::warn!(order_id = %notification.order_id, "invalid webhook signature");
        return Err(AppError::Authentication("Invalid signature".to_string()));
    }

    // Step 2: Look up the payment
    let payment: Payment = sqlx::query_as(
        r#"
        SELECT id, order_id, user_id, price_id, amount, credits_purchased,
               status, snap_redirect_url, paid_at, created_at
        FROM payments
        WHERE order_id = $1
        "#,
    )
    .bind(&notification.order_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| {
        tracing::warn!(order_id = %notification.order_id, "notification for unknown order");
        AppError::NotFound(format!("Payment not found: {}", notification.order_id))
    })?;

    // Step 3: Normalize the observed status
    let normalized = normalize_raw_status(
        &notification.transaction_status,
        notification.fraud_status.as_deref(),
    )?;

    // Step 4: Apply, with replay and concurrency handled inside
    match apply_status(&state.pool, &payment, normalized).await? {
        ApplyOutcome::Unchanged => Ok(WebhookResponse {
            message: "Status unchanged".to_string(),
            status: None,
        }),
        ApplyOutcome::Superseded => Ok(WebhookResponse {
            message: "Superseded by a concurrent update".to_string(),
            status: None,
        }),
        ApplyOutcome::Updated { credited } => {
            tracing::info!(
                order_id = %notification.order_id,
                status = normalized.as_str(),
                credited,
                "webhook notification applied"
            );
            Ok(WebhookResponse {
                message: "Webhook processed successfully".to_string(),
                status: Some(normalized),
            })
        }
    }
}

/// Axum handler wrapper around [`process_notification`].
pub async fn handle_notification(
    State(state): State<AppState>,
    Json(notification): Json<TransactionNotification>,
) -> Result<Json<WebhookResponse>, AppError> {
    process_notification(&state, &notification).await.map(Json)
}
