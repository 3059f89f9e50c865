//! The `error` module defines the error types used within `mocksub`.
//!
//! Acknowledgement failures are surfaced to the receiver that called
//! `ack`/`nack`. Receiver failures never leave the dispatch loop; they are
//! logged there and the loop moves on.

use std::error;

use thiserror::Error;

/// A dyn boxed error, returned by receiver callbacks.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// Failure reported by the transport reply primitive behind an acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport reply failed: {reason}")]
pub struct TransportError {
    pub reason: String,
}

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Error returned by [`Acknowledgement::ack`](crate::ack::Acknowledgement::ack)
/// and [`Acknowledgement::nack`](crate::ack::Acknowledgement::nack).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AckError {
    /// The transport refused to accept the message.
    #[error("failed to ack message: {0}")]
    Ack(#[source] TransportError),
    /// The transport refused to reject the message.
    #[error("failed to nack message: {0}")]
    Nack(#[source] TransportError),
}

/// Errors raised while starting the broker engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The dispatch loop is a tokio task and needs a runtime to live on.
    #[error("the engine must be started from within a tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}
