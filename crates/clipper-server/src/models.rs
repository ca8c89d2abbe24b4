//! Database models for the Clipper billing domain.

pub mod payment;
pub mod user_account;

pub use payment::{Payment, PaymentStatus};
pub use user_account::UserAccount;
