use crate::ack::Acknowledgement;
use crate::broker::message::PubsubMessage;
use crate::utils::error::BoxError;

/// Consumer callback invoked by the dispatch loop.
///
/// `receive` runs on the dispatch task and may block it; the engine does not
/// time out slow receivers. Returning an error (or panicking) is logged by the
/// engine and the message still counts as delivered.
pub trait MessageReceiver: Send + Sync + 'static {
    fn receive(&self, message: PubsubMessage, ack: Acknowledgement) -> Result<(), BoxError>;
}

impl<F> MessageReceiver for F
where
    F: Fn(PubsubMessage, Acknowledgement) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn receive(&self, message: PubsubMessage, ack: Acknowledgement) -> Result<(), BoxError> {
        self(message, ack)
    }
}
