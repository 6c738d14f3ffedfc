//! Authentication interceptor and its session state machine.
//!
//! One interceptor instance wraps one RPC channel. It owns the client's
//! long-term key pair and the mutable session state (peer public key plus
//! derived shared secret), attaches the authentication headers to every
//! outgoing call, and completes handshakes by extracting the server's public
//! key from handshake replies.
//!
//! Session states: `UNAUTHENTICATED` (no secret; calls carry only the
//! public-key header) and `AUTHENTICATED` (secret present; calls also carry
//! an authentication tag). The only transition into `AUTHENTICATED` is a
//! handshake-carrying call whose reply yields a decodable peer key; every
//! later successful handshake replaces the secret in place. There is no
//! transition back; an interceptor stays authenticated until dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use weft_crypto::ecdh::{self, EcdhKeyPair, SHARED_SECRET_LEN};
use weft_crypto::{b64, mac, PublicKey};
use zeroize::Zeroizing;

use crate::metadata::{CallMetadata, AUTH_TOKEN_HEADER, PUBLIC_KEY_HEADER};
use crate::observer::{HandshakeEvent, HandshakeObserver, TracingObserver};
use crate::request::{CallKind, RpcRequest};
use crate::transport::{CallReply, Transport};
use crate::Result;

/// The session pair, read and written as a unit.
///
/// A reader must never see a secret derived from a peer key that was not
/// also the one stored, so both fields live behind one lock and every write
/// replaces them together.
#[derive(Default)]
struct SessionState {
    peer_public_key: Option<PublicKey>,
    shared_secret: Option<Zeroizing<[u8; SHARED_SECRET_LEN]>>,
}

/// Client-side authentication interceptor for one RPC channel.
///
/// Shared by reference across concurrent calls; all session mutation is
/// serialized internally. Construction takes the provisioned long-term key
/// pair; no key generation happens here.
///
/// # Example
///
/// ```no_run
/// use weft_client::{AuthInterceptor, RpcRequest, Transport};
/// use weft_crypto::EcdhKeyPair;
///
/// async fn run(transport: impl Transport, ping: impl RpcRequest) {
///     let keypair = EcdhKeyPair::generate();
///     let interceptor = AuthInterceptor::new(keypair, transport);
///
///     // The liveness ping doubles as the handshake; once its reply carries
///     // the server key, every later call is tagged.
///     interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();
///     assert!(interceptor.is_authenticated());
/// }
/// ```
pub struct AuthInterceptor<T> {
    keypair: EcdhKeyPair,
    /// Cached url-safe encoding of the own public key; deterministic, so
    /// computed once at construction.
    encoded_public_key: String,
    transport: T,
    session: Mutex<SessionState>,
    observer: Box<dyn HandshakeObserver>,
}

impl<T: Transport> AuthInterceptor<T> {
    /// Create an interceptor around `transport`, owning `keypair`, with the
    /// default `tracing`-backed diagnostics.
    pub fn new(keypair: EcdhKeyPair, transport: T) -> Self {
        Self::with_observer(keypair, transport, TracingObserver)
    }

    /// Create an interceptor with a custom handshake observer.
    pub fn with_observer(
        keypair: EcdhKeyPair,
        transport: T,
        observer: impl HandshakeObserver + 'static,
    ) -> Self {
        let encoded_public_key = b64::encode_url_safe(&ecdh::encode_public_key(keypair.public_key()));
        Self {
            keypair,
            encoded_public_key,
            transport,
            session: Mutex::new(SessionState::default()),
            observer: Box::new(observer),
        }
    }

    /// Whether a handshake has succeeded at least once on this channel.
    pub fn is_authenticated(&self) -> bool {
        self.lock_session().shared_secret.is_some()
    }

    /// The peer public key learned from the most recent successful
    /// handshake, if any.
    pub fn peer_public_key(&self) -> Option<PublicKey> {
        self.lock_session().peer_public_key
    }

    /// The current session secret, if any.
    ///
    /// Exposed for the verifying counterpart and for inspection in tests;
    /// never logged.
    pub fn session_secret(&self) -> Option<Zeroizing<[u8; SHARED_SECRET_LEN]>> {
        self.lock_session().shared_secret.clone()
    }

    /// Dispatch one call through the transport with authentication headers
    /// attached.
    ///
    /// Every call carries the `public-key` header; calls issued while a
    /// session secret exists additionally carry `auth-token`, the HMAC-SHA256
    /// tag over the request's canonical bytes. Handshake-carrying calls also
    /// complete the handshake from the reply metadata afterwards.
    ///
    /// # Errors
    ///
    /// Only transport failures surface here, unchanged. Missing or
    /// undecodable peer keys in a handshake reply are reported to the
    /// observer and leave the session in its previous state.
    pub async fn call(&self, method: &str, request: &dyn RpcRequest) -> Result<CallReply> {
        let mut metadata = CallMetadata::new();
        metadata.insert(PUBLIC_KEY_HEADER, self.encoded_public_key.clone());

        if let Some(secret) = self.session_secret() {
            let tag = mac::compute_auth_tag(secret.as_ref(), &request.canonical_bytes());
            metadata.insert(AUTH_TOKEN_HEADER, b64::encode_url_safe(&tag));
        }

        let kind = request.kind();
        let reply = self.transport.dispatch(method, request, metadata).await?;

        if kind == CallKind::Handshake {
            self.complete_handshake(&reply.metadata);
        }

        Ok(reply)
    }

    /// Extract the peer key from handshake reply metadata and (re)derive the
    /// session secret.
    ///
    /// This is the only path that establishes or rotates the session key.
    /// Re-derivation on every successful handshake is deliberate: the secret
    /// is refreshed on each liveness ping rather than pinned to the first.
    fn complete_handshake(&self, metadata: &CallMetadata) {
        let Some(encoded) = metadata.get(PUBLIC_KEY_HEADER) else {
            self.observer.on_event(HandshakeEvent::PeerKeyMissing);
            return;
        };

        let peer_public_key = match b64::decode_url_safe(encoded)
            .and_then(|bytes| ecdh::decode_public_key(&bytes))
        {
            Ok(key) => key,
            Err(_) => {
                self.observer.on_event(HandshakeEvent::PeerKeyInvalid);
                return;
            }
        };

        let shared_secret = self.keypair.exchange(&peer_public_key);

        {
            let mut session = self.lock_session();
            session.peer_public_key = Some(peer_public_key);
            session.shared_secret = Some(shared_secret);
        }

        self.observer.on_event(HandshakeEvent::SecretEstablished);
    }

    /// Lock the session pair.
    ///
    /// A poisoned lock is recovered via `into_inner`: the guarded state is a
    /// plain value pair and every write replaces both fields under the lock,
    /// so it is consistent after any completed write.
    fn lock_session(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct TestRequest {
        kind: CallKind,
        payload: &'static [u8],
    }

    impl RpcRequest for TestRequest {
        fn kind(&self) -> CallKind {
            self.kind
        }

        fn canonical_bytes(&self) -> Vec<u8> {
            self.payload.to_vec()
        }
    }

    /// Transport replying with fixed metadata, recording what was sent.
    struct FixedReplyTransport {
        reply_metadata: CallMetadata,
        sent: StdMutex<Vec<CallMetadata>>,
    }

    impl FixedReplyTransport {
        fn new(reply_metadata: CallMetadata) -> Self {
            Self {
                reply_metadata,
                sent: StdMutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self::new(CallMetadata::new())
        }
    }

    #[async_trait]
    impl Transport for FixedReplyTransport {
        async fn dispatch(
            &self,
            _method: &str,
            _request: &dyn RpcRequest,
            metadata: CallMetadata,
        ) -> Result<CallReply> {
            self.sent.lock().unwrap().push(metadata);
            Ok(CallReply {
                metadata: self.reply_metadata.clone(),
                payload: Vec::new(),
            })
        }
    }

    fn server_reply_metadata(server: &EcdhKeyPair) -> CallMetadata {
        let mut md = CallMetadata::new();
        md.insert(
            PUBLIC_KEY_HEADER,
            b64::encode_url_safe(&ecdh::encode_public_key(server.public_key())),
        );
        md
    }

    /// Test a fresh interceptor starts unauthenticated
    #[tokio::test]
    async fn test_initial_state_unauthenticated() {
        let interceptor = AuthInterceptor::new(EcdhKeyPair::generate(), FixedReplyTransport::empty());
        assert!(!interceptor.is_authenticated());
        assert!(interceptor.session_secret().is_none());
    }

    /// Test pre-handshake calls carry the public key and no tag
    #[tokio::test]
    async fn test_pre_handshake_headers() {
        let keypair = EcdhKeyPair::from_private(&[0x42; 32]).unwrap();
        let expected_key = b64::encode_url_safe(&ecdh::encode_public_key(keypair.public_key()));

        let interceptor = AuthInterceptor::new(keypair, FixedReplyTransport::empty());
        let request = TestRequest {
            kind: CallKind::Standard,
            payload: b"payload",
        };
        interceptor.call("weft.Fleet/Pull", &request).await.unwrap();

        let sent = interceptor.transport.sent.lock().unwrap();
        assert_eq!(sent[0].get(PUBLIC_KEY_HEADER), Some(expected_key.as_str()));
        assert!(!sent[0].contains(AUTH_TOKEN_HEADER));
    }

    /// Test a handshake reply establishes the ECDH-symmetric secret
    #[tokio::test]
    async fn test_handshake_establishes_secret() {
        let client = EcdhKeyPair::from_private(&[0x11; 32]).unwrap();
        let server = EcdhKeyPair::from_private(&[0x22; 32]).unwrap();
        let expected = server.exchange(client.public_key());

        let transport = FixedReplyTransport::new(server_reply_metadata(&server));
        let interceptor = AuthInterceptor::new(client, transport);
        let ping = TestRequest {
            kind: CallKind::Handshake,
            payload: b"ping",
        };
        interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();

        assert!(interceptor.is_authenticated());
        assert_eq!(*interceptor.session_secret().unwrap(), *expected);
    }

    /// Test a standard call never completes a handshake even if the reply
    /// carries a key
    #[tokio::test]
    async fn test_standard_call_ignores_reply_key() {
        let server = EcdhKeyPair::generate();
        let transport = FixedReplyTransport::new(server_reply_metadata(&server));
        let interceptor = AuthInterceptor::new(EcdhKeyPair::generate(), transport);

        let request = TestRequest {
            kind: CallKind::Standard,
            payload: b"payload",
        };
        interceptor.call("weft.Fleet/Pull", &request).await.unwrap();

        assert!(!interceptor.is_authenticated());
    }

    /// Test post-handshake calls carry a tag bound to the payload
    #[tokio::test]
    async fn test_post_handshake_tag() {
        let client = EcdhKeyPair::from_private(&[0x11; 32]).unwrap();
        let server = EcdhKeyPair::from_private(&[0x22; 32]).unwrap();

        let transport = FixedReplyTransport::new(server_reply_metadata(&server));
        let interceptor = AuthInterceptor::new(client, transport);

        let ping = TestRequest {
            kind: CallKind::Handshake,
            payload: b"ping",
        };
        interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();

        let request = TestRequest {
            kind: CallKind::Standard,
            payload: b"task result",
        };
        interceptor.call("weft.Fleet/Push", &request).await.unwrap();

        let secret = interceptor.session_secret().unwrap();
        let expected_tag = mac::compute_auth_tag(secret.as_ref(), b"task result");

        let sent = interceptor.transport.sent.lock().unwrap();
        let tag = b64::decode_url_safe(sent[1].get(AUTH_TOKEN_HEADER).unwrap()).unwrap();
        assert_eq!(tag, expected_tag);
    }

    /// Test a missing peer key leaves the session unchanged and surfaces no
    /// error
    #[tokio::test]
    async fn test_missing_peer_key_degrades_gracefully() {
        let interceptor = AuthInterceptor::new(EcdhKeyPair::generate(), FixedReplyTransport::empty());
        let ping = TestRequest {
            kind: CallKind::Handshake,
            payload: b"ping",
        };

        interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();
        assert!(!interceptor.is_authenticated());

        // The next call is still public-key-only.
        let request = TestRequest {
            kind: CallKind::Standard,
            payload: b"payload",
        };
        interceptor.call("weft.Fleet/Pull", &request).await.unwrap();
        let sent = interceptor.transport.sent.lock().unwrap();
        assert!(!sent[1].contains(AUTH_TOKEN_HEADER));
    }

    /// Test an undecodable peer key leaves the session unchanged
    #[tokio::test]
    async fn test_invalid_peer_key_degrades_gracefully() {
        let off_curve = b64::encode_url_safe(&[0xff; 65]);
        for bad in ["", "!!!not-base64!!!", off_curve.as_str()] {
            let mut md = CallMetadata::new();
            md.insert(PUBLIC_KEY_HEADER, bad);

            let interceptor =
                AuthInterceptor::new(EcdhKeyPair::generate(), FixedReplyTransport::new(md));
            let ping = TestRequest {
                kind: CallKind::Handshake,
                payload: b"ping",
            };
            interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();
            assert!(!interceptor.is_authenticated());
        }
    }

    /// Test every successful handshake rotates the secret
    #[tokio::test]
    async fn test_handshake_rotates_secret() {
        let client = EcdhKeyPair::from_private(&[0x11; 32]).unwrap();
        let server_a = EcdhKeyPair::from_private(&[0x22; 32]).unwrap();
        let server_b = EcdhKeyPair::from_private(&[0x33; 32]).unwrap();

        // The server rotates its key between the two pings.
        struct SequenceTransport {
            replies: StdMutex<Vec<CallMetadata>>,
        }

        #[async_trait]
        impl Transport for SequenceTransport {
            async fn dispatch(
                &self,
                _method: &str,
                _request: &dyn RpcRequest,
                _metadata: CallMetadata,
            ) -> Result<CallReply> {
                Ok(CallReply {
                    metadata: self.replies.lock().unwrap().remove(0),
                    payload: Vec::new(),
                })
            }
        }

        let transport = SequenceTransport {
            replies: StdMutex::new(vec![
                server_reply_metadata(&server_a),
                server_reply_metadata(&server_b),
            ]),
        };
        let interceptor = AuthInterceptor::new(client, transport);
        let ping = TestRequest {
            kind: CallKind::Handshake,
            payload: b"ping",
        };

        interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();
        let first = interceptor.session_secret().unwrap();

        interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();
        let second = interceptor.session_secret().unwrap();

        assert_ne!(*first, *second);
        assert_eq!(
            *second,
            *interceptor.keypair.exchange(server_b.public_key())
        );
    }

    /// Test a failed handshake after success keeps the previous secret
    #[tokio::test]
    async fn test_failed_handshake_keeps_previous_secret() {
        let client = EcdhKeyPair::from_private(&[0x11; 32]).unwrap();
        let server = EcdhKeyPair::from_private(&[0x22; 32]).unwrap();

        // First reply carries the key, later replies carry nothing.
        struct OnceTransport {
            first: StdMutex<Option<CallMetadata>>,
        }

        #[async_trait]
        impl Transport for OnceTransport {
            async fn dispatch(
                &self,
                _method: &str,
                _request: &dyn RpcRequest,
                _metadata: CallMetadata,
            ) -> Result<CallReply> {
                Ok(CallReply {
                    metadata: self.first.lock().unwrap().take().unwrap_or_default(),
                    payload: Vec::new(),
                })
            }
        }

        let transport = OnceTransport {
            first: StdMutex::new(Some(server_reply_metadata(&server))),
        };
        let interceptor = AuthInterceptor::new(client, transport);
        let ping = TestRequest {
            kind: CallKind::Handshake,
            payload: b"ping",
        };

        interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();
        let established = interceptor.session_secret().unwrap();

        interceptor.call("weft.Fleet/Ping", &ping).await.unwrap();
        assert_eq!(*interceptor.session_secret().unwrap(), *established);
    }

    /// Test transport errors propagate unchanged and leave the session alone
    #[tokio::test]
    async fn test_transport_error_propagates() {
        struct FailingTransport;

        #[async_trait]
        impl Transport for FailingTransport {
            async fn dispatch(
                &self,
                _method: &str,
                _request: &dyn RpcRequest,
                _metadata: CallMetadata,
            ) -> Result<CallReply> {
                Err(Error::Transport("connection reset".into()))
            }
        }

        let interceptor = AuthInterceptor::new(EcdhKeyPair::generate(), FailingTransport);
        let ping = TestRequest {
            kind: CallKind::Handshake,
            payload: b"ping",
        };

        let err = interceptor.call("weft.Fleet/Ping", &ping).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(!interceptor.is_authenticated());
    }
}
