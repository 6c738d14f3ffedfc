//! HMAC-SHA256 authentication tags.
//!
//! Once a session secret exists, every outgoing call carries a tag computed
//! over the exact serialized request payload. The server recomputes the tag
//! over the received bytes, so any tampering after tag computation fails
//! verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 authentication tag.
pub const TAG_LEN: usize = 32;

/// Compute the HMAC-SHA256 tag of `message` under `secret`.
///
/// Deterministic: identical inputs always produce the identical 32-byte tag.
///
/// # Example
///
/// ```
/// use weft_crypto::mac::{compute_auth_tag, TAG_LEN};
///
/// let tag = compute_auth_tag(&[0x0b; 32], b"serialized request");
/// assert_eq!(tag.len(), TAG_LEN);
/// assert_eq!(tag, compute_auth_tag(&[0x0b; 32], b"serialized request"));
/// ```
pub fn compute_auth_tag(secret: &[u8], message: &[u8]) -> [u8; TAG_LEN] {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(message);

    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    tag
}

/// Verify an HMAC-SHA256 tag in constant time.
///
/// Returns `true` iff `tag` is the HMAC-SHA256 of `message` under `secret`.
/// This is the verifying half used by the server-side counterpart and by
/// tests; comparison time does not depend on where the tags differ.
pub fn verify_auth_tag(secret: &[u8], message: &[u8], tag: &[u8]) -> bool {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(message);
    mac.verify_slice(tag).is_ok()
}
