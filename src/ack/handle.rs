use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use super::reply::{AckReply, NoopReply};
use crate::utils::error::AckError;

/// Outcome recorded on an [`Acknowledgement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckState {
    /// Neither `ack` nor `nack` has succeeded yet.
    #[default]
    Unset,
    Acked,
    Nacked,
}

impl AckState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => AckState::Acked,
            2 => AckState::Nacked,
            _ => AckState::Unset,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            AckState::Unset => 0,
            AckState::Acked => 1,
            AckState::Nacked => 2,
        }
    }
}

/// Per-delivery recorder of a receiver's accept/reject decision.
///
/// Clones share the same recorded state, which lets the engine keep a copy
/// and read the outcome once the receiver callback has returned. The state
/// can be overwritten any number of times; the last successful call wins.
#[derive(Clone)]
pub struct Acknowledgement {
    reply: Arc<dyn AckReply>,
    state: Arc<AtomicU8>,
}

impl Acknowledgement {
    pub fn new(reply: Arc<dyn AckReply>) -> Self {
        Self {
            reply,
            state: Arc::new(AtomicU8::new(AckState::Unset.as_u8())),
        }
    }

    /// Accepts the message. The recorded state is only touched if the
    /// transport accepted the call.
    pub fn ack(&self) -> Result<(), AckError> {
        self.reply.accept().map_err(AckError::Ack)?;
        self.record(AckState::Acked);
        Ok(())
    }

    /// Rejects the message. Same failure rules as [`ack`](Self::ack).
    pub fn nack(&self) -> Result<(), AckError> {
        self.reply.reject().map_err(AckError::Nack)?;
        self.record(AckState::Nacked);
        Ok(())
    }

    pub fn state(&self) -> AckState {
        AckState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `true` only if the last successful call was `ack`.
    ///
    /// A nacked handle and an untouched handle both report `false`; use
    /// [`state`](Self::state) to tell them apart.
    pub fn is_acked(&self) -> bool {
        self.state() == AckState::Acked
    }

    fn record(&self, state: AckState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

impl Default for Acknowledgement {
    fn default() -> Self {
        Self::new(Arc::new(NoopReply))
    }
}

impl fmt::Debug for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acknowledgement")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
