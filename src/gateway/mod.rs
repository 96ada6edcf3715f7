//! Client contract for the push-messaging backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::PushMessage;
use crate::report::BatchReport;

/// A whole-batch send failure, as opposed to a per-token delivery failure
/// inside an otherwise successful response. Never swallowed by the channel;
/// it aborts the remainder of the `send` call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Authentication failure: {0}")]
    Auth(String),

    #[error("Backend rejected the batch: {0}")]
    Rejected(String),
}

/// Client for the push-messaging backend.
///
/// Implementations own the wire protocol and authentication. The channel
/// guarantees `tokens.len()` never exceeds the configured batch size
/// ([`crate::TOKENS_PER_REQUEST`] by default).
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Send one message to a chunk of device tokens, returning one
    /// [`crate::report::DeliveryReport`] per token in chunk order.
    async fn send_multicast(
        &self,
        message: &PushMessage,
        tokens: &[String],
    ) -> Result<BatchReport, TransportError>;
}
