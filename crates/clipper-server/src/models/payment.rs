//! Payment model for tracking credit pack purchases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Possible states of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Checkout initiated, gateway outcome not yet observed.
    Pending,
    /// Funds settled; credits have been granted.
    Paid,
    /// Declined, cancelled, or checkout-link creation failed.
    Failed,
    /// Checkout window lapsed without payment.
    Expired,
}

impl PaymentStatus {
    /// Whether the pull sync should re-query the gateway for this payment.
    ///
    /// `paid` is terminal. `failed` stays in the candidate set because a
    /// dispute or chargeback reversal can flip a declined charge to settled;
    /// `expired` does not, because a lapsed checkout link is never revived.
    pub fn is_reconcilable(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Failed)
    }

    /// The persisted spelling, matching the `payment_status` enum.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        }
    }
}

/// Represents a credit pack purchase.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    /// Unique identifier for this payment record.
    pub id: Uuid,
    /// Externally-visible order identifier, the join key with the gateway.
    pub order_id: String,
    /// User who initiated the purchase.
    pub user_id: Uuid,
    /// Price tier key the purchase was made against.
    pub price_id: String,
    /// Charge amount in the smallest currency unit.
    pub amount: i64,
    /// Credits granted when this payment settles.
    pub credits_purchased: i32,
    /// Current payment status.
    pub status: PaymentStatus,
    /// Hosted checkout link, once the gateway has issued one.
    pub snap_redirect_url: Option<String>,
    /// Set exactly when status becomes `paid`; null otherwise.
    pub paid_at: Option<DateTime<Utc>>,
    /// When this payment was created.
    pub created_at: DateTime<Utc>,
}
