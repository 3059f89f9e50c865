//! # mocksub
//!
//! `mocksub` is an in-memory, topic-based publish/subscribe engine with
//! explicit acknowledgements. It stands in for a cloud messaging service in
//! tests: producers publish, one receiver per topic consumes, and a background
//! polling task does the delivery.
//!
//! ## Core Modules
//!
//! - `ack`: the per-delivery acknowledgement handle and the reply primitive it delegates to.
//! - `broker`: the engine, its message records and the receiver interface.
//! - `config`: loading engine and logging settings.
//! - `utils`: error types and logging setup.

pub mod ack;
pub mod broker;
pub mod config;
pub mod utils;

pub use ack::{AckReply, AckState, Acknowledgement, NoopReply};
pub use broker::{DEFAULT_TOPIC, MessageReceiver, MockPubSubEngine, PubsubMessage};
pub use utils::error::{AckError, BoxError, EngineError, TransportError};

#[cfg(test)]
mod tests;
