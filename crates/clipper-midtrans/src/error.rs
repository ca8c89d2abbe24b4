//! Error type for gateway interactions.

/// Errors produced while talking to, or interpreting, the payment gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network-level failure or timeout on an outbound gateway call.
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success HTTP status.
    #[error("Gateway rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// A Snap response arrived without the hosted checkout link.
    #[error("Gateway response did not include a redirect URL")]
    MissingRedirectUrl,

    /// A transaction status outside the six known gateway codes.
    /// Never defaulted: an unknown code means the gateway contract changed.
    #[error("Unknown gateway transaction status: {0}")]
    UnknownStatus(String),
}

impl GatewayError {
    /// True for failures worth retrying (network trouble, gateway 5xx);
    /// contract-level errors are not retryable.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Http(_) => true,
            GatewayError::Rejected { status, .. } => *status >= 500,
            GatewayError::MissingRedirectUrl | GatewayError::UnknownStatus(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::Rejected {
            status: 503,
            body: "unavailable".to_string()
        }
        .is_transient());
        assert!(!GatewayError::Rejected {
            status: 401,
            body: "bad key".to_string()
        }
        .is_transient());
        assert!(!GatewayError::UnknownStatus("refund".to_string()).is_transient());
        assert!(!GatewayError::MissingRedirectUrl.is_transient());
    }
}
