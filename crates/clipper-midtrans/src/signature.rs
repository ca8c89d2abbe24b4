//! Webhook notification signature.
//!
//! The gateway signs every server-to-server notification with
//! hex(SHA-512(order_id || status_code || gross_amount || server_key)).
//! The server key is shared only between this service and the gateway, so a
//! matching signature authenticates the sender.

use sha2::{Digest, Sha512};

/// Computes the expected notification signature as a lowercase hex string.
pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies a supplied signature against the recomputed one.
pub fn verify_notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
    signature_key: &str,
) -> bool {
    notification_signature(order_id, status_code, gross_amount, server_key) == signature_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha512_known_vectors() {
        // SHA-512 of the empty string is well-known
        assert_eq!(
            notification_signature("", "", "", ""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
        // The four fields are concatenated before hashing, so any split of
        // "hello" must produce the same digest
        let hello = "9b71d224bd62f3785d96d46ad3ea3d73319bfbc2890caadae2dff72519673ca7\
                     2323c3d99ba5c11d7c7acc6e14b8c5da0c4663475c2e5c3adef46f73bcdec043";
        assert_eq!(notification_signature("hel", "lo", "", ""), hello);
        assert_eq!(notification_signature("", "h", "ell", "o"), hello);
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let sig = notification_signature("order-1", "200", "150000.00", "key");
        assert_eq!(sig.len(), 128);
        assert!(sig
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn test_verify_rejects_mismatch() {
        let sig = notification_signature("order-1", "200", "150000.00", "key");
        assert!(verify_notification_signature(
            "order-1",
            "200",
            "150000.00",
            "key",
            &sig
        ));
        assert!(!verify_notification_signature(
            "order-1",
            "200",
            "150000.00",
            "other-key",
            &sig
        ));
        assert!(!verify_notification_signature(
            "order-2",
            "200",
            "150000.00",
            "key",
            &sig
        ));
    }
}
