use std::time::Duration;

use mocksub::config::load_config;
use mocksub::{Acknowledgement, BoxError, MockPubSubEngine, PubsubMessage};
use tracing::info;

/// Runs the engine against a logging receiver until ctrl-c.
///
/// Publishes one message per poll interval on the default topic.
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // logging may not be initialised if the config failed to load
        eprintln!("mocksub failed: {e}");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    mocksub::utils::logging::init(&config.logging.level);

    let engine = MockPubSubEngine::start(config.engine.clone())?;
    engine.register_receiver(
        |message: PubsubMessage, ack: Acknowledgement| -> Result<(), BoxError> {
            info!(
                message_id = %message.message_id,
                payload = %String::from_utf8_lossy(&message.data),
                "received"
            );
            ack.ack()?;
            Ok(())
        },
    );

    let period = config.engine.poll_interval().max(Duration::from_millis(100));
    let mut ticker = tokio::time::interval(period);
    let mut sequence = 0u64;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sequence += 1;
                let message = PubsubMessage::new(format!("tick {sequence}"))
                    .with_attribute("seq", sequence.to_string());
                engine.publish(message);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received. Exiting gracefully.");
                break;
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}
