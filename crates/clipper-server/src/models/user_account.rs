//! User account model, the owner of the credit balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user account as seen by the billing component.
///
/// The credit balance is mutated only by the reconciler's atomic
/// status-plus-credit update; display code reads it, nothing else writes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    /// Unique identifier for this user.
    pub id: Uuid,
    /// Contact email, forwarded to the hosted checkout page.
    pub email: String,
    /// Display name, optional.
    pub name: Option<String>,
    /// Current credit balance.
    pub credits: i32,
    /// When this account was created.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// First name forwarded to the checkout page: the display name if set,
    /// otherwise the local part of the email address.
    pub fn checkout_first_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: Option<&str>, email: &str) -> UserAccount {
        UserAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(str::to_string),
            credits: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_checkout_first_name_prefers_display_name() {
        let user = account(Some("Rani"), "rani@example.com");
        assert_eq!(user.checkout_first_name(), "Rani");
    }

    #[test]
    fn test_checkout_first_name_falls_back_to_email_local_part() {
        let user = account(None, "rani@example.com");
        assert_eq!(user.checkout_first_name(), "rani");

        let user = account(Some(""), "budi@example.com");
        assert_eq!(user.checkout_first_name(), "budi");
    }
}
