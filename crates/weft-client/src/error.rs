//! Error types for client-side call authentication.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Client operation errors.
///
/// Handshake-completion problems (missing or undecodable peer key) are not
/// errors at this level: they are recovered locally and reported through the
/// [`HandshakeObserver`](crate::HandshakeObserver) so the session degrades to
/// unauthenticated calls instead of failing the RPC.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure, propagated unchanged from the dispatch seam.
    #[error("Transport failed: {0}")]
    Transport(String),

    /// Cryptographic operation failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] weft_crypto::Error),
}
