//! Structured handshake diagnostics.
//!
//! Handshake-completion problems are non-fatal: the session stays in its
//! previous state and the call still succeeds. They are reported as events
//! through an injected observer rather than written to an output stream, so
//! the core stays testable. Events never carry key material.

use std::fmt;

/// Diagnostic events emitted while completing a handshake-carrying call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeEvent {
    /// A peer key was decoded and a session secret (re)derived.
    SecretEstablished,
    /// The handshake reply carried no public-key header; session unchanged.
    PeerKeyMissing,
    /// The public-key header did not decode to a valid curve point; session
    /// unchanged.
    PeerKeyInvalid,
}

impl fmt::Display for HandshakeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeEvent::SecretEstablished => write!(f, "session secret established"),
            HandshakeEvent::PeerKeyMissing => write!(f, "handshake reply without public key"),
            HandshakeEvent::PeerKeyInvalid => write!(f, "handshake reply with invalid public key"),
        }
    }
}

/// Receiver for handshake diagnostics.
pub trait HandshakeObserver: Send + Sync {
    /// Called once per handshake-carrying call after the reply metadata has
    /// been examined.
    fn on_event(&self, event: HandshakeEvent);
}

impl<O: HandshakeObserver + ?Sized> HandshakeObserver for std::sync::Arc<O> {
    fn on_event(&self, event: HandshakeEvent) {
        (**self).on_event(event);
    }
}

/// Default observer logging through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl HandshakeObserver for TracingObserver {
    fn on_event(&self, event: HandshakeEvent) {
        match event {
            HandshakeEvent::SecretEstablished => tracing::info!("{event}"),
            HandshakeEvent::PeerKeyMissing | HandshakeEvent::PeerKeyInvalid => {
                tracing::warn!("{event}; continuing unauthenticated");
            }
        }
    }
}
