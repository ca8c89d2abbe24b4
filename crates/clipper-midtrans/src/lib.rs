// Clipper Midtrans - gateway vocabulary and client for the Clipper payment service

pub mod client;
pub mod error;
pub mod notification;
pub mod signature;
pub mod status;

pub use client::{
    default_enabled_payments, CheckoutCallbacks, CheckoutCustomer, CheckoutItem,
    CheckoutTransaction, GatewayClient, GatewayConfig, SnapCheckoutRequest, SnapTransaction,
    TransactionStatusResponse,
};
pub use error::GatewayError;
pub use notification::TransactionNotification;
pub use signature::{notification_signature, verify_notification_signature};
pub use status::{TransactionStatus, FRAUD_CHALLENGE};
