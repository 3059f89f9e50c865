use std::time::Duration;

use serde::Deserialize;

use crate::broker::DEFAULT_TOPIC;

/// Top-level configuration settings for the application.
///
/// Includes settings for the engine and for logging.
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub engine: EngineSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the pub/sub engine.
///
/// Controls how often the dispatch loop scans for undelivered messages and
/// which topic is used when callers don't name one.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub poll_interval_ms: u64,
    pub default_topic: String,
}

impl EngineSettings {
    /// Poll interval as a duration, never shorter than one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub engine: Option<PartialEngineSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialEngineSettings {
    pub poll_interval_ms: Option<u64>,
    pub default_topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            default_topic: DEFAULT_TOPIC.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
