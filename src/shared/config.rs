use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::shared::errors::ConfigError;

/// Environment variable that takes precedence over `notifier.webhook_url`.
pub const WEBHOOK_URL_ENV: &str = "HOTELWATCH_WEBHOOK_URL";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the configuration file, falling back to the built-in defaults when
    /// it cannot be read, parsed, or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Config {
        let env_webhook = std::env::var(WEBHOOK_URL_ENV).ok();
        Self::load_with_webhook_override(path, env_webhook)
    }

    pub fn load_with_webhook_override<P: AsRef<Path>>(
        path: P,
        webhook_url: Option<String>,
    ) -> Config {
        let path = path.as_ref();
        let mut config = match Self::try_load(path) {
            Ok(cfg) => {
                info!("✅ Loaded configuration from {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("⚠️ {} ({}); using default configuration", e, path.display());
                Config::default()
            }
        };

        if let Some(url) = webhook_url.filter(|u| !u.trim().is_empty()) {
            info!("Webhook URL taken from {}", WEBHOOK_URL_ENV);
            config.notifier.webhook_url = Some(url);
        }

        config
    }

    pub fn try_load(path: &Path) -> Result<Config, ConfigError> {
        let config = Config::from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}
