use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::batch::TOKENS_PER_REQUEST;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub channel: ChannelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Maximum tokens per multicast request. The backend caps this at 500.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    TOKENS_PER_REQUEST
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("channel.batch_size", TOKENS_PER_REQUEST as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // CHANNEL__BATCH_SIZE, etc. The double-underscore separator
            // keeps single underscores inside field names intact.
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_batch_size_matches_backend_limit() {
        let config = ChannelConfig::default();
        assert_eq!(config.batch_size, 500);
    }

    // Defaults and the environment override share one test because they
    // both touch the process environment.
    #[test]
    fn settings_layer_defaults_and_environment() {
        env::remove_var("CHANNEL__BATCH_SIZE");
        let settings = Settings::new().unwrap();
        assert_eq!(settings.channel.batch_size, 500);

        env::set_var("CHANNEL__BATCH_SIZE", "7");
        let settings = Settings::new().unwrap();
        assert_eq!(settings.channel.batch_size, 7);

        env::remove_var("CHANNEL__BATCH_SIZE");
    }
}
