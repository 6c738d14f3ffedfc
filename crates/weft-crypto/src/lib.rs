//! Cryptographic primitives for weft channel authentication.
//!
//! This crate implements the building blocks the client interceptor needs to
//! authenticate an RPC channel without a pre-shared secret:
//! - ECDH key agreement over NIST P-256 with canonical public-key encoding
//! - HMAC-SHA256 authentication tags bound to serialized call payloads
//! - base64url (no padding) codec for metadata-safe transport of key material
//!
//! Security requirements:
//! - No unsafe code
//! - All shared secrets use `Zeroizing` wrappers
//! - Tag verification is constant-time
//! - No logging of key material

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod b64;
pub mod ecdh;
pub mod error;
pub mod mac;

pub use ecdh::EcdhKeyPair;
pub use error::{Error, Result};
pub use p256::PublicKey;
pub use zeroize::Zeroizing;
