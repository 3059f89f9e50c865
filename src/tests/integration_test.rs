use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::EngineSettings;
use crate::{Acknowledgement, BoxError, MockPubSubEngine, PubsubMessage};

type Log = Arc<Mutex<Vec<(String, Instant)>>>;

fn logging_receiver(
    log: Log,
) -> impl Fn(PubsubMessage, Acknowledgement) -> Result<(), BoxError> + Send + Sync + 'static {
    move |message, ack| {
        let body = String::from_utf8_lossy(&message.data).into_owned();
        log.lock().unwrap().push((body, Instant::now()));
        ack.ack()?;
        Ok(())
    }
}

async fn wait_for_len(log: &Log, len: usize) {
    tokio::time::timeout(Duration::from_secs(3), async {
        while log.lock().unwrap().len() < len {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("messages were not delivered in time");
}

#[tokio::test]
async fn integration_late_receiver_gets_backlog_within_one_interval() {
    let engine = MockPubSubEngine::start(EngineSettings::default()).unwrap();
    let poll = EngineSettings::default().poll_interval();
    let log: Log = Arc::default();

    engine.publish_to(PubsubMessage::new("M1"), "orders");
    tokio::time::sleep(poll / 2).await;
    assert_eq!(engine.undelivered("orders"), 1);

    let registered_at = Instant::now();
    engine.register_receiver_for(logging_receiver(log.clone()), "orders");
    wait_for_len(&log, 1).await;

    let (body, received_at) = log.lock().unwrap()[0].clone();
    assert_eq!(body, "M1");
    // one interval plus scheduling slack
    assert!(received_at - registered_at <= poll * 2);

    tokio::time::sleep(poll * 2).await;
    assert_eq!(log.lock().unwrap().len(), 1);
    assert!(engine.records()[0].delivered);

    engine.shutdown().await;
}

#[tokio::test]
async fn integration_same_topic_delivered_in_publish_order() {
    let settings = EngineSettings {
        poll_interval_ms: 20,
        ..EngineSettings::default()
    };
    let engine = MockPubSubEngine::start(settings).unwrap();
    let log: Log = Arc::default();

    engine.register_receiver_for(logging_receiver(log.clone()), "orders");
    engine.publish_to(PubsubMessage::new("M1"), "orders");
    engine.publish_to(PubsubMessage::new("M2"), "orders");
    wait_for_len(&log, 2).await;

    let log = log.lock().unwrap();
    assert_eq!(log[0].0, "M1");
    assert_eq!(log[1].0, "M2");
    assert!(log[0].1 <= log[1].1);
}

#[tokio::test]
async fn integration_shutdown_leaves_backlog_undelivered() {
    let settings = EngineSettings {
        poll_interval_ms: 20,
        ..EngineSettings::default()
    };
    let engine = MockPubSubEngine::start(settings).unwrap();
    let log: Log = Arc::default();

    engine.register_receiver_for(logging_receiver(log.clone()), "orders");
    engine.publish_to(PubsubMessage::new("M1"), "orders");
    wait_for_len(&log, 1).await;

    engine.close();
    engine.publish_to(PubsubMessage::new("M2"), "orders");
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(log.lock().unwrap().len(), 1);
    assert_eq!(engine.undelivered("orders"), 1);
}
