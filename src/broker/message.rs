//! Message definitions for the broker
//!
//! `PubsubMessage` is what producers publish and receivers get handed.
//! `MessageRecord` is the engine's bookkeeping around it.
//!
//! Notes on fields:
//! - `message_id`: opaque unique id; the engine generates one on publish if empty
//! - `data`: opaque payload bytes, never inspected by the engine
//! - `attributes`: free-form string metadata
//! - `publish_time`: milliseconds since UNIX epoch; set on publish if zero

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubsubMessage {
    pub message_id: String,
    pub data: Vec<u8>,
    pub attributes: BTreeMap<String, String>,
    pub publish_time: i64,
}

impl PubsubMessage {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// One published message together with its destination and delivery latch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub message: PubsubMessage,
    pub topic: String,
    pub delivered: bool,
}

impl MessageRecord {
    pub fn new(message: PubsubMessage, topic: String) -> Self {
        Self {
            message,
            topic,
            delivered: false,
        }
    }
}
