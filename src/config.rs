//! Store configuration.
//!
//! ```toml
//! name = "app"
//! version = 2
//! store_name = "settings"
//! settle_delay_ms = 0
//! probe_before_reuse = true
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default database name.
pub const DEFAULT_NAME: &str = "serialstore";

/// Default object store name.
pub const DEFAULT_STORE_NAME: &str = "keyvaluepairs";

/// Settings for one [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Database name passed to the engine
    pub name: String,
    /// Schema version requested at open; must be positive
    pub version: u32,
    /// Object store holding the key/value pairs
    pub store_name: String,
    /// Pause after each operation, in milliseconds (`0` yields once)
    pub settle_delay_ms: u64,
    /// Probe a cached session before reusing it
    pub probe_before_reuse: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            version: 1,
            store_name: DEFAULT_STORE_NAME.to_string(),
            settle_delay_ms: 0,
            probe_before_reuse: true,
        }
    }
}

impl StoreConfig {
    /// Parse a config from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".into()));
        }
        if self.version == 0 {
            return Err(ConfigError::Invalid("version must be positive".into()));
        }
        if self.store_name.is_empty() {
            return Err(ConfigError::Invalid("store_name must not be empty".into()));
        }
        Ok(())
    }

    /// Settle delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
