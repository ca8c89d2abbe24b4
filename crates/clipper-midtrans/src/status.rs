//! Raw transaction status vocabulary of the Midtrans gateway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Fraud sub-status indicating a captured charge is under manual review.
/// A capture under challenge is not yet treated as settled funds.
pub const FRAUD_CHALLENGE: &str = "challenge";

/// The six transaction statuses the gateway is known to report.
///
/// Anything outside this set is rejected at parse time rather than mapped to
/// a default, so a gateway contract change surfaces as an error instead of a
/// payment silently stuck in `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Card charge captured; settled funds unless fraud review holds it.
    Capture,
    /// Funds settled (bank transfer, e-wallet, or post-capture).
    Settlement,
    /// Transaction created, awaiting customer action.
    Pending,
    /// Charge declined by the gateway or the fraud system.
    Deny,
    /// Transaction cancelled before settlement.
    Cancel,
    /// Checkout window lapsed without payment.
    Expire,
}

impl TransactionStatus {
    /// The wire spelling used by the gateway.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Capture => "capture",
            TransactionStatus::Settlement => "settlement",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Deny => "deny",
            TransactionStatus::Cancel => "cancel",
            TransactionStatus::Expire => "expire",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capture" => Ok(TransactionStatus::Capture),
            "settlement" => Ok(TransactionStatus::Settlement),
            "pending" => Ok(TransactionStatus::Pending),
            "deny" => Ok(TransactionStatus::Deny),
            "cancel" => Ok(TransactionStatus::Cancel),
            "expire" => Ok(TransactionStatus::Expire),
            other => Err(GatewayError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        assert_eq!(
            "capture".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Capture
        );
        assert_eq!(
            "settlement".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Settlement
        );
        assert_eq!(
            "pending".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Pending
        );
        assert_eq!(
            "deny".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Deny
        );
        assert_eq!(
            "cancel".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Cancel
        );
        assert_eq!(
            "expire".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Expire
        );
    }

    #[test]
    fn test_parse_unknown_status_rejected() {
        let err = "refund".parse::<TransactionStatus>().unwrap_err();
        assert!(matches!(err, GatewayError::UnknownStatus(ref s) if s == "refund"));

        assert!("".parse::<TransactionStatus>().is_err());
        assert!("Settlement".parse::<TransactionStatus>().is_err());
        assert!("authorize".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_as_str_roundtrip() {
        for status in [
            TransactionStatus::Capture,
            TransactionStatus::Settlement,
            TransactionStatus::Pending,
            TransactionStatus::Deny,
            TransactionStatus::Cancel,
            TransactionStatus::Expire,
        ] {
            assert_eq!(status.as_str().parse::<TransactionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_serde_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Settlement).unwrap(),
            "\"settlement\""
        );
        assert_eq!(
            serde_json::from_str::<TransactionStatus>("\"expire\"").unwrap(),
            TransactionStatus::Expire
        );
    }
}
