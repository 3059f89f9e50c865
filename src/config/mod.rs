mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{EngineSettings, LoggingSettings, Settings};

/// Prefix for environment overrides, e.g. `MOCKSUB_ENGINE__POLL_INTERVAL_MS`.
pub const ENV_PREFIX: &str = "MOCKSUB";

/// Loads the configuration from `config/default.*`, `.env` and environment variables.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Loads the configuration using `path` (without extension) as the optional
/// config file, then merges environment overrides and fills the gaps with
/// default values.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    // a missing .env is the common case
    let _ = dotenvy::dotenv();

    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        engine: EngineSettings {
            poll_interval_ms: partial
                .engine
                .as_ref()
                .and_then(|e| e.poll_interval_ms)
                .unwrap_or(default.engine.poll_interval_ms),
            default_topic: partial
                .engine
                .as_ref()
                .and_then(|e| e.default_topic.clone())
                .unwrap_or(default.engine.default_topic),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}
