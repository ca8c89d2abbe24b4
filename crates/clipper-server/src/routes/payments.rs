//! Checkout initiation and billing endpoints.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clipper_midtrans::{
    default_enabled_payments, CheckoutCallbacks, CheckoutCustomer, CheckoutItem,
    CheckoutTransaction, SnapCheckoutRequest,
};

use crate::error::AppError;
use crate::models::{Payment, PaymentStatus, UserAccount};
use crate::pricing::PriceTier;
use crate::reconcile::{sync_user_payments, SyncReport};
use crate::routes::{webhook, AppState};

/// Creates the payments router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_payments))
        .route("/pricing", get(get_pricing))
        .route("/checkout", post(create_checkout))
        .route("/balance", get(get_balance))
        .route("/sync", post(sync_payments))
        .route("/webhook/midtrans", post(webhook::handle_notification))
        .with_state(state)
}

/// Request body for initiating a checkout.
/// Note: In a real deployment, the user_id would come from authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// The user purchasing credits.
    pub user_id: Uuid,
    /// Price tier key from the catalog.
    pub price_id: String,
}

/// Response for successful checkout initiation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// The created payment record.
    pub payment_id: Uuid,
    /// Order identifier shared with the gateway.
    pub order_id: String,
    /// Hosted checkout page for the caller to redirect to.
    pub redirect_url: String,
}

/// Builds a human-diagnosable order identifier: tier, creation timestamp in
/// unix millis, and a short user fragment. Uniqueness is best-effort; the
/// UNIQUE constraint on payments.order_id turns a collision into an insert
/// error rather than two payments sharing one gateway transaction.
fn new_order_id(price_id: &str, user_id: Uuid) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let user = user_id.simple().to_string();
    format!("clipper-{}-{}-{}", price_id, millis, &user[..6])
}

/// Loads a user account by id.
async fn load_user(state: &AppState, user_id: Uuid) -> Result<UserAccount, AppError> {
    sqlx::query_as(
        r#"
        SELECT id, email, name, credits, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User not found: {}", user_id)))
}

/// Opens a payment row in `pending` before the gateway is contacted.
async fn insert_pending_payment(
    state: &AppState,
    user_id: Uuid,
    order_id: &str,
    tier: &PriceTier,
) -> Result<Payment, AppError> {
    sqlx::query_as(
        r#"
        INSERT INTO payments (id, order_id, user_id, price_id, amount, credits_purchased, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, order_id, user_id, price_id, amount, credits_purchased,
                  status, snap_redirect_url, paid_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(user_id)
    .bind(&tier.id)
    .bind(tier.amount)
    .bind(tier.credits)
    .bind(PaymentStatus::Pending)
    .fetch_one(&state.pool)
    .await
    .map_err(AppError::from)
}

/// Best-effort transition of a freshly-opened payment to `failed` after the
/// gateway declined to issue a checkout link.
async fn mark_checkout_failed(state: &AppState, payment_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE payments
        SET status = $1
        WHERE id = $2 AND status = $3
        "#,
    )
    .bind(PaymentStatus::Failed)
    .bind(payment_id)
    .bind(PaymentStatus::Pending)
    .execute(&state.pool)
    .await?;

    Ok(())
}

/// Persists the hosted checkout link on the payment row.
async fn store_redirect_url(
    state: &AppState,
    payment_id: Uuid,
    redirect_url: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE payments
        SET snap_redirect_url = $1
        WHERE id = $2
        "#,
    )
    .bind(redirect_url)
    .bind(payment_id)
    .execute(&state.pool)
    .await?;

    Ok(())
}

/// POST /api/v1/payments/checkout
///
/// Initiates a credit pack purchase: resolves the price tier, opens a
/// `pending` payment, asks the gateway for a hosted checkout link, and
/// returns the redirect URL. Credits are NOT granted here; settlement
/// arrives later through the webhook or the pull sync.
async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    // Step 1: Resolve the price tier
    let tier = state.prices.resolve(&request.price_id)?.clone();

    // Step 2: Load the purchasing user for the checkout customer details
    let user = load_user(&state, request.user_id).await?;

    // Step 3: Create the payment row first, in `pending`
    let order_id = new_order_id(&tier.id, user.id);
    let payment = insert_pending_payment(&state, user.id, &order_id, &tier).await?;

    // Step 4: Ask the gateway for a hosted checkout link
    let snap_request = SnapCheckoutRequest {
        transaction_details: CheckoutTransaction {
            order_id: order_id.clone(),
            gross_amount: tier.amount,
        },
        item_details: vec![CheckoutItem {
            id: tier.id.clone(),
            price: tier.amount,
            quantity: 1,
            name: tier.label.clone(),
        }],
        customer_details: CheckoutCustomer {
            email: user.email.clone(),
            first_name: user.checkout_first_name(),
        },
        callbacks: CheckoutCallbacks {
            finish: format!("{}/dashboard?payment=finished", state.public_base_url),
        },
        enabled_payments: default_enabled_payments(),
        notification_url: format!(
            "{}/api/v1/payments/webhook/midtrans",
            state.public_base_url
        ),
    };

    let transaction = match state.gateway.create_transaction(&snap_request).await {
        Ok(transaction) => transaction,
        Err(gateway_err) => {
            // Best-effort rollback to `failed`; a failure here is logged and
            // swallowed so the gateway error stays the one the caller sees.
            if let Err(update_err) = mark_checkout_failed(&state, payment.id).await {
                tracing::warn!(
                    order_id = %order_id,
                    error = %update_err,
                    "could not mark payment failed after gateway error"
                );
            }
            return Err(gateway_err.into());
        }
    };

    // Step 5: Persist the redirect link and hand it to the caller
    store_redirect_url(&state, payment.id, &transaction.redirect_url).await?;

    Ok(Json(CheckoutResponse {
        payment_id: payment.id,
        order_id,
        redirect_url: transaction.redirect_url,
    }))
}

/// Query string for user-scoped billing endpoints.
/// Note: In a real deployment, the user_id would come from authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/payments?userId=
///
/// Payment history for the billing page, newest first.
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let payments: Vec<Payment> = sqlx::query_as(
        r#"
        SELECT id, order_id, user_id, price_id, amount, credits_purchased,
               status, snap_redirect_url, paid_at, created_at
        FROM payments
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(query.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(payments))
}

/// Response for the balance endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user_id: Uuid,
    pub credits: i32,
}

/// GET /api/v1/payments/balance?userId=
async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<BalanceResponse>, AppError> {
    let credits: Option<i32> = sqlx::query_scalar(
        r#"
        SELECT credits
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(query.user_id)
    .fetch_optional(&state.pool)
    .await?;

    let credits = credits
        .ok_or_else(|| AppError::NotFound(format!("User not found: {}", query.user_id)))?;

    Ok(Json(BalanceResponse {
        user_id: query.user_id,
        credits,
    }))
}

/// GET /api/v1/payments/pricing
///
/// The injected price catalog, for rendering the billing page.
async fn get_pricing(State(state): State<AppState>) -> Json<Vec<PriceTier>> {
    Json(state.prices.tiers().to_vec())
}

/// Request body for a pull reconciliation run.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/payments/sync
///
/// Re-queries the gateway for the user's reconcilable payments and applies
/// what it reports. Per-payment failures are counted in the report, never
/// surfaced as an error.
async fn sync_payments(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncReport>, AppError> {
    let report = sync_user_payments(&state.pool, &state.gateway, request.user_id).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_shape() {
        let user_id = Uuid::new_v4();
        let order_id = new_order_id("small", user_id);

        assert!(order_id.starts_with("clipper-small-"));

        let fragment = order_id.rsplit('-').next().unwrap();
        assert_eq!(fragment.len(), 6);
        assert!(user_id.simple().to_string().starts_with(fragment));

        let millis: i64 = order_id.split('-').nth(2).unwrap().parse().unwrap();
        assert!(millis > 0);
    }

    #[test]
    fn test_order_ids_differ_across_users() {
        let a = new_order_id("medium", Uuid::new_v4());
        let b = new_order_id("medium", Uuid::new_v4());
        // Same tier and (likely) same millisecond; the user fragment keeps
        // the identifiers apart.
        assert_ne!(
            a.rsplit('-').next().unwrap(),
            b.rsplit('-').next().unwrap()
        );
    }
}
