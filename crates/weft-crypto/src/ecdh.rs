//! ECDH key agreement over NIST P-256.
//!
//! The interceptor advertises its public key on every call and derives a
//! session secret from the server's key the first time a handshake reply
//! carries one. Key agreement is plain ECDH (NIST SP 800-56A) on the P-256
//! curve; the shared secret is the x-coordinate of the scalar product.
//!
//! # Security
//!
//! - Private keys and shared secrets are wrapped in `Zeroizing<>` so they are
//!   cleared from memory when dropped.
//! - Uses the `p256` crate from RustCrypto, which validates that decoded
//!   public keys are on the curve.
//! - Public keys are encoded in uncompressed form (0x04 || x || y) per SEC 1,
//!   which is canonical: the same key always encodes to the same 65 bytes.
//!
//! # Example
//!
//! ```
//! use weft_crypto::ecdh::EcdhKeyPair;
//!
//! // Client and server each hold a long-term keypair.
//! let client = EcdhKeyPair::generate();
//! let server = EcdhKeyPair::generate();
//!
//! // Both sides arrive at the same shared secret.
//! let client_secret = client.exchange(server.public_key());
//! let server_secret = server.exchange(client.public_key());
//! assert_eq!(*client_secret, *server_secret);
//! ```

use crate::{Error, Result};
use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, PublicKey, SecretKey};
use zeroize::Zeroizing;

/// Length of an uncompressed SEC 1 P-256 public key (0x04 || x || y).
pub const PUBLIC_KEY_LEN: usize = 65;

/// Length of a P-256 private scalar and of the derived shared secret.
pub const SHARED_SECRET_LEN: usize = 32;

/// Long-term P-256 key pair for elliptic curve Diffie-Hellman key agreement.
///
/// Holds a private scalar and its corresponding public point. The private
/// scalar is zeroed when the pair is dropped. The pair is immutable for the
/// lifetime of the interceptor that owns it.
pub struct EcdhKeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl EcdhKeyPair {
    /// Generate a new random P-256 key pair using a cryptographically secure RNG.
    ///
    /// # Example
    ///
    /// ```
    /// use weft_crypto::ecdh::{encode_public_key, EcdhKeyPair, PUBLIC_KEY_LEN};
    ///
    /// let keypair = EcdhKeyPair::generate();
    /// assert_eq!(encode_public_key(keypair.public_key()).len(), PUBLIC_KEY_LEN);
    /// ```
    pub fn generate() -> Self {
        let secret_key = SecretKey::random(&mut rand::rngs::OsRng);
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    /// Restore a key pair from an existing 32-byte big-endian private scalar.
    ///
    /// This is how provisioned long-term keys enter the interceptor, and how
    /// tests pin known key material.
    ///
    /// # Errors
    ///
    /// Returns an error if the scalar has the wrong length or is not a valid
    /// P-256 private key (zero, or not below the group order).
    ///
    /// # Example
    ///
    /// ```
    /// use weft_crypto::ecdh::EcdhKeyPair;
    ///
    /// let keypair = EcdhKeyPair::from_private(&[0x42; 32]).unwrap();
    /// let same = EcdhKeyPair::from_private(&[0x42; 32]).unwrap();
    /// assert_eq!(keypair.public_key(), same.public_key());
    /// ```
    pub fn from_private(private_key: &[u8]) -> Result<Self> {
        if private_key.len() != SHARED_SECRET_LEN {
            return Err(Error::InvalidKeyLength {
                expected: SHARED_SECRET_LEN,
                actual: private_key.len(),
            });
        }

        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|_| Error::InvalidPrivateKey("Invalid P-256 private scalar".into()))?;
        let public_key = secret_key.public_key();

        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// Get the public point of this key pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Perform P-256 ECDH key agreement with a peer's public key.
    ///
    /// Returns the 32-byte shared secret (the x-coordinate of the product
    /// point) wrapped in `Zeroizing`. The operation is symmetric: for key
    /// pairs A and B, `A.exchange(B.public_key()) == B.exchange(A.public_key())`.
    pub fn exchange(&self, peer_public: &PublicKey) -> Zeroizing<[u8; SHARED_SECRET_LEN]> {
        let shared_secret =
            diffie_hellman(self.secret_key.to_nonzero_scalar(), peer_public.as_affine());

        let mut result = [0u8; SHARED_SECRET_LEN];
        result.copy_from_slice(shared_secret.raw_secret_bytes().as_slice());
        Zeroizing::new(result)
    }
}

/// Encode a P-256 public key in uncompressed SEC 1 form (65 bytes).
///
/// The encoding is canonical and deterministic: the same key always produces
/// the same bytes, so the value is stable across calls and processes.
pub fn encode_public_key(key: &PublicKey) -> Vec<u8> {
    key.to_encoded_point(false).as_bytes().to_vec()
}

/// Decode a P-256 public key from uncompressed SEC 1 bytes.
///
/// # Errors
///
/// Returns an error if the input has the wrong length, does not carry the
/// uncompressed-point marker, or does not represent a point on the curve.
///
/// # Example
///
/// ```
/// use weft_crypto::ecdh::{decode_public_key, encode_public_key, EcdhKeyPair};
///
/// let keypair = EcdhKeyPair::generate();
/// let bytes = encode_public_key(keypair.public_key());
/// let decoded = decode_public_key(&bytes).unwrap();
/// assert_eq!(&decoded, keypair.public_key());
/// ```
pub fn decode_public_key(bytes: &[u8]) -> Result<PublicKey> {
    if bytes.len() != PUBLIC_KEY_LEN {
        return Err(Error::InvalidKeyLength {
            expected: PUBLIC_KEY_LEN,
            actual: bytes.len(),
        });
    }

    if bytes[0] != 0x04 {
        return Err(Error::InvalidPublicKey(
            "P-256 public key must use uncompressed format (0x04 prefix)".into(),
        ));
    }

    let encoded_point = EncodedPoint::from_bytes(bytes)
        .map_err(|_| Error::InvalidPublicKey("Failed to parse P-256 public key".into()))?;

    Option::<PublicKey>::from(PublicKey::from_encoded_point(&encoded_point))
        .ok_or_else(|| Error::InvalidPublicKey("Invalid P-256 public key point".into()))
}
