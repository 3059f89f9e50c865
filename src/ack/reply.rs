use crate::utils::error::TransportError;

/// Transport-level reply primitive an [`Acknowledgement`](super::Acknowledgement)
/// delegates to.
///
/// A real client would forward these to the broker; the in-memory engine only
/// needs something that can succeed or fail.
pub trait AckReply: Send + Sync + 'static {
    /// Tells the transport the message was processed.
    fn accept(&self) -> Result<(), TransportError>;

    /// Tells the transport the message was rejected and may be redelivered.
    fn reject(&self) -> Result<(), TransportError>;
}

/// Reply primitive that accepts every call and does nothing.
///
/// This is what the engine hands out unless told otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReply;

impl AckReply for NoopReply {
    fn accept(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn reject(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
