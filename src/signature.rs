//! HMAC-SHA256 validation of the `X-Hub-Signature-256` webhook header.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Checks a `sha256=<hex>` signature header against the raw request body.
/// Comparison happens in constant time via the MAC verifier.
pub fn is_valid(secret: &str, signature: &str, body: &[u8]) -> bool {
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
