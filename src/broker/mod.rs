pub mod engine;
pub mod message;
pub mod receiver;

pub use engine::{DEFAULT_TOPIC, MockPubSubEngine};
pub use message::{MessageRecord, PubsubMessage};
pub use receiver::MessageReceiver;
