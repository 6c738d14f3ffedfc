//! base64url codec without padding.
//!
//! Key material and authentication tags travel in string-valued call
//! metadata, so they are encoded with the URL- and filename-safe base64
//! alphabet and no trailing padding. The encoded form never contains `+`,
//! `/`, or `=`.

use crate::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Encode bytes as base64url without padding.
///
/// # Example
///
/// ```
/// use weft_crypto::b64::encode_url_safe;
///
/// let encoded = encode_url_safe(&[0xfb, 0xff, 0xbf]);
/// assert_eq!(encoded, "-_-_");
/// ```
pub fn encode_url_safe(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a base64url string without padding.
///
/// # Errors
///
/// Returns an error if the input contains characters outside the url-safe
/// alphabet or has an invalid length.
pub fn decode_url_safe(encoded: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| Error::Decode(e.to_string()))
}
