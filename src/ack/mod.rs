//! Acknowledgement handles
//!
//! Every delivery hands the receiver a fresh [`Acknowledgement`]. The
//! receiver records its decision with `ack()` or `nack()`; the handle forwards
//! that decision to an [`AckReply`] primitive and remembers the last
//! successful call so tests can assert on it afterwards.

pub mod handle;
pub mod reply;

pub use handle::{AckState, Acknowledgement};
pub use reply::{AckReply, NoopReply};
