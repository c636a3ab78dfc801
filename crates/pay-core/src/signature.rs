//! # Signatures
//!
//! HMAC-SHA256 helpers shared by payment verification and webhook checks.
//! Signatures are lowercase hex digests and are always compared in
//! constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Separator between order id and payment id in the signed payload
pub const PAYMENT_SIGNATURE_SEPARATOR: char = '|';

/// Compute a hex-encoded HMAC-SHA256 of `message` keyed by `secret`
pub fn compute_hmac_sha256(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Compare two strings without short-circuiting on the first differing byte
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Canonical string signed by the provider after checkout: `{order_id}|{payment_id}`
pub fn payment_signature_payload(order_id: &str, payment_id: &str) -> String {
    format!("{}{}{}", order_id, PAYMENT_SIGNATURE_SEPARATOR, payment_id)
}

/// Expected checkout signature for an order/payment pair
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    compute_hmac_sha256(
        secret.as_bytes(),
        payment_signature_payload(order_id, payment_id).as_bytes(),
    )
}

/// Check a client-supplied checkout signature
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    constant_time_eq(&payment_signature(secret, order_id, payment_id), signature)
}

/// Check a webhook signature against the exact raw body bytes
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    constant_time_eq(&compute_hmac_sha256(secret.as_bytes(), body), signature)
}
