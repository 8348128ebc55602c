use sha2::{Digest, Sha512};

use crate::MidtransNotification;

/// Computes the `signature_key` Midtrans attaches to notifications:
/// `hex(SHA512(order_id + status_code + gross_amount + server_key))`.
pub fn notification_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks the notification's signature against the server key. The comparison does not short-circuit.
pub fn verify_notification_signature(notification: &MidtransNotification, server_key: &str) -> bool {
    let expected = notification_signature(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        server_key,
    );
    let given = notification.signature_key.trim().to_ascii_lowercase();
    expected.len() == given.len() && expected.bytes().zip(given.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
