use seo_core::{Error, Result};
use seo_storage::StorageConfig;
use std::env;
use std::time::Duration;

use crate::autosave::DEFAULT_AUTOSAVE_INTERVAL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub storage: StorageConfig,
    pub autosave_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Storage settings from the environment plus `SEO_AUTOSAVE_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            storage: StorageConfig::from_env()?,
            ..Self::default()
        };
        if let Ok(secs) = env::var("SEO_AUTOSAVE_SECS") {
            let secs = secs
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("Invalid SEO_AUTOSAVE_SECS: {}", e)))?;
            config.autosave_interval = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.autosave_interval.is_zero() {
            return Err(Error::Config("autosave interval must be greater than zero".to_string()));
        }
        Ok(())
    }
}
