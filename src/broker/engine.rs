//! Broker engine
//!
//! This module contains the in-memory engine responsible for:
//! - recording published messages in an append-only log
//! - keeping at most one receiver per topic (last registration wins)
//! - delivering undelivered messages from a background polling task
//!
//! Concurrency and usage notes:
//! - `publish*` and `register_receiver*` may be called from any thread or
//!   task. The log and the registry are each behind their own mutex and no
//!   lock is held while a receiver runs, so receivers may publish or
//!   register from inside their callback.
//! - The dispatch loop is a single tokio task spawned by [`MockPubSubEngine::start`].
//!   It sleeps for the poll interval, then scans every registered topic on
//!   tokio's blocking pool, so a slow receiver never stalls producers. A
//!   message's `delivered` flag is set once and never cleared, so each message
//!   reaches a receiver at most once. A receiver replaced mid-scan stops
//!   receiving before its next message.
//! - Shutdown is cooperative: [`MockPubSubEngine::close`] clears the running
//!   flag and wakes a sleeping loop. A scan already in progress completes.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::ack::{AckReply, Acknowledgement, NoopReply};
use crate::broker::message::{MessageRecord, PubsubMessage};
use crate::broker::receiver::MessageReceiver;
use crate::config::EngineSettings;
use crate::utils::error::EngineError;

/// Topic used by [`MockPubSubEngine::publish`] and
/// [`MockPubSubEngine::register_receiver`] unless configured otherwise.
pub const DEFAULT_TOPIC: &str = "DEFAULT_TOPIC";

type Receivers = HashMap<String, Arc<dyn MessageReceiver>>;

/// State shared between the engine handle and its dispatch task.
struct Shared {
    messages: Mutex<Vec<MessageRecord>>,
    receivers: Mutex<Receivers>,
    running: AtomicBool,
    wake: Notify,
    reply: Arc<dyn AckReply>,
    poll_interval: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // receivers run outside every lock, so a poisoned guard still holds consistent data
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory stand-in for a cloud pub/sub service.
///
/// Dropping the engine requests shutdown; use [`shutdown`](Self::shutdown)
/// to also wait for the dispatch task to finish.
pub struct MockPubSubEngine {
    shared: Arc<Shared>,
    default_topic: String,
    worker: Option<JoinHandle<()>>,
}

impl MockPubSubEngine {
    /// Starts an engine whose acknowledgements always succeed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(settings: EngineSettings) -> Result<Self, EngineError> {
        Self::start_with_reply(settings, Arc::new(NoopReply))
    }

    /// Starts an engine whose acknowledgements delegate to `reply`.
    pub fn start_with_reply(
        settings: EngineSettings,
        reply: Arc<dyn AckReply>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Handle::try_current()?;
        let poll_interval = settings.poll_interval();

        let shared = Arc::new(Shared {
            messages: Mutex::new(Vec::new()),
            receivers: Mutex::new(HashMap::new()),
            running: AtomicBool::new(true),
            wake: Notify::new(),
            reply,
            poll_interval,
        });

        let worker = runtime.spawn(dispatch_loop(shared.clone()));
        info!(
            poll_interval_ms = u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX),
            default_topic = %settings.default_topic,
            "pub/sub engine started"
        );

        Ok(Self {
            shared,
            default_topic: settings.default_topic,
            worker: Some(worker),
        })
    }

    pub fn default_topic(&self) -> &str {
        &self.default_topic
    }

    /// Publishes to the default topic.
    pub fn publish(&self, message: PubsubMessage) {
        let topic = self.default_topic.clone();
        self.publish_to(message, topic);
    }

    /// Appends `message` to the log as undelivered. Publishing to a topic
    /// nobody listens on is fine; the message waits for a receiver.
    pub fn publish_to(&self, mut message: PubsubMessage, topic: impl Into<String>) {
        let topic = topic.into();

        if message.message_id.is_empty() {
            message.message_id = Uuid::new_v4().to_string();
        }
        if message.publish_time == 0 {
            message.publish_time = chrono::Utc::now().timestamp_millis();
        }

        debug!(message_id = %message.message_id, %topic, "message published");
        lock(&self.shared.messages).push(MessageRecord::new(message, topic));
    }

    /// Registers `receiver` on the default topic.
    pub fn register_receiver<R: MessageReceiver>(&self, receiver: R) {
        let topic = self.default_topic.clone();
        self.register_receiver_for(receiver, topic);
    }

    /// Installs `receiver` for `topic`, replacing any previous one.
    ///
    /// Messages published before the registration are delivered too.
    pub fn register_receiver_for<R: MessageReceiver>(&self, receiver: R, topic: impl Into<String>) {
        let topic = topic.into();
        let replaced = lock(&self.shared.receivers)
            .insert(topic.clone(), Arc::new(receiver))
            .is_some();
        debug!(%topic, replaced, "receiver registered");
    }

    pub fn has_receiver(&self, topic: &str) -> bool {
        lock(&self.shared.receivers).contains_key(topic)
    }

    /// Snapshot of every message published so far, in publish order.
    pub fn records(&self) -> Vec<MessageRecord> {
        lock(&self.shared.messages).clone()
    }

    /// Number of messages on `topic` still waiting for delivery.
    pub fn undelivered(&self, topic: &str) -> usize {
        lock(&self.shared.messages)
            .iter()
            .filter(|record| record.topic == topic && !record.delivered)
            .count()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Requests shutdown. The dispatch task exits once its current sleep or
    /// scan completes; no receiver is invoked after that.
    pub fn close(&self) {
        if self.shared.running.swap(false, Ordering::AcqRel) {
            // notify_one keeps a permit if the loop is mid-scan
            self.shared.wake.notify_one();
            debug!("engine shutdown requested");
        }
    }

    /// Requests shutdown and waits for the dispatch task to exit.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                error!("dispatch task ended abnormally: {e}");
            }
        }
    }
}

impl Drop for MockPubSubEngine {
    fn drop(&mut self) {
        self.close();
    }
}

async fn dispatch_loop(shared: Arc<Shared>) {
    debug!("dispatch loop started");

    while shared.running.load(Ordering::Acquire) {
        tokio::select! {
            _ = tokio::time::sleep(shared.poll_interval) => {}
            _ = shared.wake.notified() => {
                debug!("dispatch loop interrupted");
            }
        }

        if !shared.running.load(Ordering::Acquire) {
            break;
        }

        // receivers may block, keep them off the runtime's worker threads
        let scanner = shared.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || scanner.scan()).await {
            error!("dispatch scan ended abnormally: {e}");
        }
    }

    info!("dispatch loop stopped");
}

impl Shared {
    fn scan(&self) {
        let receivers: Vec<(String, Arc<dyn MessageReceiver>)> = lock(&self.receivers)
            .iter()
            .map(|(topic, receiver)| (topic.clone(), receiver.clone()))
            .collect();

        for (topic, receiver) in receivers {
            self.deliver_pending(&topic, &receiver);
        }
    }

    /// Hands every undelivered message on `topic` to `receiver`, in publish
    /// order. A failing receiver still consumes the message it failed on;
    /// its remaining messages wait for the next scan, as do the remaining
    /// messages of a receiver that was replaced while the scan ran.
    fn deliver_pending(&self, topic: &str, receiver: &Arc<dyn MessageReceiver>) {
        let pending: Vec<(usize, PubsubMessage)> = lock(&self.messages)
            .iter()
            .enumerate()
            .filter(|(_, record)| record.topic == topic && !record.delivered)
            .map(|(index, record)| (index, record.message.clone()))
            .collect();

        for (index, message) in pending {
            if !self.is_registered(topic, receiver) {
                debug!(%topic, "receiver replaced mid-scan, leaving rest for its successor");
                return;
            }

            let message_id = message.message_id.clone();
            let ack = Acknowledgement::new(self.reply.clone());

            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| receiver.receive(message, ack.clone())));
            self.mark_delivered(index);

            match outcome {
                Ok(Ok(())) => {
                    trace!(%topic, %message_id, ack = ?ack.state(), "message delivered");
                }
                Ok(Err(e)) => {
                    warn!(%topic, %message_id, error = %e, "receiver failed, skipping rest of topic this scan");
                    return;
                }
                Err(_) => {
                    error!(%topic, %message_id, "receiver panicked, skipping rest of topic this scan");
                    return;
                }
            }
        }
    }

    fn is_registered(&self, topic: &str, receiver: &Arc<dyn MessageReceiver>) -> bool {
        lock(&self.receivers)
            .get(topic)
            .is_some_and(|current| Arc::ptr_eq(current, receiver))
    }

    fn mark_delivered(&self, index: usize) {
        // the log is append-only, so indices taken during the scan stay valid
        if let Some(record) = lock(&self.messages).get_mut(index) {
            record.delivered = true;
        }
    }
}
