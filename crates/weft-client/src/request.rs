//! Outgoing request abstraction.
//!
//! The interceptor needs two things from a request: its canonical byte
//! serialization (for tag computation, identical to what the transport puts
//! on the wire) and whether the call is handshake-carrying. The latter is an
//! explicit, enumerated kind declared by the request type, never inferred by
//! probing the payload for an incidental field.

/// Kind of an outgoing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Ordinary call; the reply's metadata is not inspected.
    Standard,
    /// Handshake-carrying call (e.g. the periodic liveness ping); the reply
    /// is expected to carry the server's public key, triggering session
    /// secret (re)derivation.
    Handshake,
}

/// An outgoing RPC request as the interceptor sees it.
///
/// `canonical_bytes` must be pure and must match the transport's own wire
/// encoding of the same request, so that the authentication tag is computed
/// over bytes equivalent to what is transmitted.
pub trait RpcRequest: Send + Sync {
    /// The declared kind of this call.
    fn kind(&self) -> CallKind;

    /// Canonical, deterministic serialization of this request.
    fn canonical_bytes(&self) -> Vec<u8>;
}
