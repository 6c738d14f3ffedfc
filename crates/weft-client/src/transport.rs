//! Transport dispatch seam.
//!
//! The interceptor does not move bytes itself; it hands the request and the
//! prepared outgoing metadata to an injected transport and gets back the
//! reply with its response metadata. Timeouts, retries, and cancellation are
//! the transport's responsibility. If the transport cancels or fails a
//! handshake call, the interceptor never reaches key extraction for that
//! call and session state is left unchanged.

use crate::metadata::CallMetadata;
use crate::request::RpcRequest;
use crate::Result;
use async_trait::async_trait;

/// Reply to a dispatched call: response metadata plus the payload bytes.
#[derive(Debug, Clone)]
pub struct CallReply {
    /// Response metadata, readable after dispatch completes.
    pub metadata: CallMetadata,
    /// Serialized response payload.
    pub payload: Vec<u8>,
}

/// An RPC transport capable of dispatching one call.
///
/// Errors returned here propagate unchanged through the interceptor to the
/// caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch `request` on `method` with the given outgoing metadata.
    async fn dispatch(
        &self,
        method: &str,
        request: &dyn RpcRequest,
        metadata: CallMetadata,
    ) -> Result<CallReply>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn dispatch(
        &self,
        method: &str,
        request: &dyn RpcRequest,
        metadata: CallMetadata,
    ) -> Result<CallReply> {
        (**self).dispatch(method, request, metadata).await
    }
}
