//! Payment reconciliation: status normalization and the atomic
//! status-plus-credit settlement shared by the webhook (push) and the
//! billing-page sync (pull).
//!
//! Both entry points funnel into [`apply_status`], the only code in this
//! service that increments a user's credit balance.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use clipper_midtrans::{GatewayClient, TransactionStatus, FRAUD_CHALLENGE};

use crate::error::AppError;
use crate::models::{Payment, PaymentStatus};

/// Maps a gateway transaction status (plus fraud sub-status) to the
/// internal payment status.
///
/// A captured charge under fraud review is held at `pending`: the funds are
/// not treated as settled until the review accepts the charge.
pub fn normalize_status(
    status: TransactionStatus,
    fraud_status: Option<&str>,
) -> PaymentStatus {
    if status == TransactionStatus::Capture && fraud_status == Some(FRAUD_CHALLENGE) {
        return PaymentStatus::Pending;
    }
    match status {
        TransactionStatus::Capture | TransactionStatus::Settlement => PaymentStatus::Paid,
        TransactionStatus::Pending => PaymentStatus::Pending,
        TransactionStatus::Deny | TransactionStatus::Cancel => PaymentStatus::Failed,
        TransactionStatus::Expire => PaymentStatus::Expired,
    }
}

/// Parses a raw wire status and normalizes it.
///
/// An unknown code is a validation failure, never a silent default: a
/// default of `pending` would mask a gateway contract change as a payment
/// stuck forever in limbo.
pub fn normalize_raw_status(
    raw: &str,
    fraud_status: Option<&str>,
) -> Result<PaymentStatus, AppError> {
    let status = raw
        .parse::<TransactionStatus>()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(normalize_status(status, fraud_status))
}

/// Outcome of applying an observed status to a stored payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Observed status equals the stored one; nothing was written.
    Unchanged,
    /// The payment row was updated; `credited` reports whether the user's
    /// balance was incremented in the same transaction.
    Updated { credited: bool },
    /// A concurrent writer advanced the payment first; nothing was written.
    Superseded,
}

/// Applies a normalized status observation to a payment, atomically.
///
/// The update and the conditional credit increment run in one transaction.
/// The `status = $4` predicate re-checks the stored status inside that
/// transaction: if a concurrent webhook or sync already advanced the row,
/// the update matches zero rows and the whole transaction rolls back
/// without touching the balance. Credits are granted only on a
/// non-`paid` to `paid` transition, so replays and late duplicates can
/// never credit twice.
pub async fn apply_status(
    pool: &PgPool,
    payment: &Payment,
    normalized: PaymentStatus,
) -> Result<ApplyOutcome, AppError> {
    if normalized == payment.status {
        return Ok(ApplyOutcome::Unchanged);
    }

    let paid_at = if normalized == PaymentStatus::Paid {
        Some(chrono::Utc::now())
    } else {
        None
    };

    let mut tx = pool.begin().await?;

    let rows_affected = sqlx::query(
        r#"
        UPDATE payments
        SET status = $1, paid_at = $2
        WHERE id = $3 AND status = $4
        "#,
    )
    .bind(normalized)
    .bind(paid_at)
    .bind(payment.id)
    .bind(payment.status)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        // Someone else applied an observation between our read and this
        // update; their transition is already committed and authoritative.
        tx.rollback().await?;
        return Ok(ApplyOutcome::Superseded);
    }

    // `normalized != payment.status` and the predicate above matched, so a
    // `paid` result here implies the previous status was not `paid`.
    let credited = normalized == PaymentStatus::Paid;
    if credited {
        sqlx::query(
            r#"
            UPDATE users
            SET credits = credits + $1
            WHERE id = $2
            "#,
        )
        .bind(payment.credits_purchased)
        .bind(payment.user_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(ApplyOutcome::Updated { credited })
}

/// Per-user summary of a pull reconciliation run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SyncReport {
    /// Payments in the candidate set.
    pub examined: usize,
    /// Payments whose stored status changed.
    pub updated: usize,
    /// Payments whose transition granted credits.
    pub credited: usize,
    /// Payments whose gateway status matched the stored one, or whose
    /// transition was applied by a concurrent writer first.
    pub unchanged: usize,
    /// Payments whose lookup or update failed; logged, never fatal.
    pub failed: usize,
}

/// Reconciles one payment against the gateway's authoritative status.
async fn reconcile_one(
    pool: &PgPool,
    gateway: &GatewayClient,
    payment: &Payment,
) -> Result<ApplyOutcome, AppError> {
    let response = gateway.transaction_status(&payment.order_id).await?;
    let normalized =
        normalize_raw_status(&response.transaction_status, response.fraud_status.as_deref())?;
    apply_status(pool, payment, normalized).await
}

/// Pull path: re-queries the gateway for every payment of `user_id` still
/// in a reconcilable state and applies what it reports.
///
/// Candidate set is `pending` and `failed` only. `paid` is terminal;
/// `expired` is never re-queried because a lapsed checkout link cannot be
/// revived, while a `failed` charge can still flip to settled through a
/// dispute reversal.
///
/// Best-effort: a failure on one payment is logged and counted, and the
/// remaining batch continues. Only an inability to enumerate the user's
/// payments raises.
pub async fn sync_user_payments(
    pool: &PgPool,
    gateway: &GatewayClient,
    user_id: Uuid,
) -> Result<SyncReport, AppError> {
    let candidates: Vec<Payment> = sqlx::query_as(
        r#"
        SELECT id, order_id, user_id, price_id, amount, credits_purchased,
               status, snap_redirect_url, paid_at, created_at
        FROM payments
        WHERE user_id = $1 AND status IN ('pending', 'failed')
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut report = SyncReport {
        examined: candidates.len(),
        ..SyncReport::default()
    };

    for payment in &candidates {
        match reconcile_one(pool, gateway, payment).await {
            Ok(ApplyOutcome::Updated { credited }) => {
                report.updated += 1;
                if credited {
                    report.credited += 1;
                }
                tracing::info!(
                    order_id = %payment.order_id,
                    previous = payment.status.as_str(),
                    credited,
                    "payment reconciled"
                );
            }
            Ok(ApplyOutcome::Unchanged | ApplyOutcome::Superseded) => {
                report.unchanged += 1;
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!(
                    order_id = %payment.order_id,
                    error = %e,
                    "failed to reconcile payment"
                );
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mapping_table() {
        assert_eq!(
            normalize_status(TransactionStatus::Capture, None),
            PaymentStatus::Paid
        );
        assert_eq!(
            normalize_status(TransactionStatus::Settlement, None),
            PaymentStatus::Paid
        );
        assert_eq!(
            normalize_status(TransactionStatus::Pending, None),
            PaymentStatus::Pending
        );
        assert_eq!(
            normalize_status(TransactionStatus::Deny, None),
            PaymentStatus::Failed
        );
        assert_eq!(
            normalize_status(TransactionStatus::Cancel, None),
            PaymentStatus::Failed
        );
        assert_eq!(
            normalize_status(TransactionStatus::Expire, None),
            PaymentStatus::Expired
        );
    }

    #[test]
    fn test_capture_under_fraud_challenge_stays_pending() {
        assert_eq!(
            normalize_status(TransactionStatus::Capture, Some("challenge")),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_capture_with_accepted_fraud_review_is_paid() {
        assert_eq!(
            normalize_status(TransactionStatus::Capture, Some("accept")),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_challenge_only_holds_captures() {
        // The hold applies to captured card charges; a settlement is
        // settled funds regardless of the sub-status field.
        assert_eq!(
            normalize_status(TransactionStatus::Settlement, Some("challenge")),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_unknown_raw_status_is_validation_error() {
        let err = normalize_raw_status("refund", None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_known_raw_status_normalizes() {
        assert_eq!(
            normalize_raw_status("settlement", None).unwrap(),
            PaymentStatus::Paid
        );
        assert_eq!(
            normalize_raw_status("capture", Some("challenge")).unwrap(),
            PaymentStatus::Pending
        );
    }
}
