//! Client-side channel authentication for the weft compute fabric.
//!
//! Clients prove their identity on every RPC once a session key has been
//! negotiated, without any pre-shared secret. This crate implements the
//! client half of that protocol:
//! - Public-key advertisement on every outgoing call
//! - Lazy shared-secret derivation, triggered by handshake-carrying calls
//!   (the periodic liveness ping)
//! - Per-call HMAC authentication tags bound to the exact transmitted payload
//!
//! Transport and serialization stay outside this crate: the interceptor
//! drives an injected [`Transport`] and reads canonical request bytes through
//! [`RpcRequest`]. See `weft-crypto` for the underlying primitives.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod interceptor;
pub mod metadata;
pub mod observer;
pub mod request;
pub mod transport;

pub use error::{Error, Result};
pub use interceptor::AuthInterceptor;
pub use metadata::{CallMetadata, AUTH_TOKEN_HEADER, PUBLIC_KEY_HEADER};
pub use observer::{HandshakeEvent, HandshakeObserver, TracingObserver};
pub use request::{CallKind, RpcRequest};
pub use transport::{CallReply, Transport};
