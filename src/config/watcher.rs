use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Change channel parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatcherConfig {
    /// Capacity of each watcher's change channel
    ///
    /// Producers block once this many changes are waiting for a `Next` call.
    #[serde(default = "default_change_buffer_size")]
    pub change_buffer_size: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            change_buffer_size: default_change_buffer_size(),
        }
    }
}

impl WatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.change_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watcher change_buffer_size must be greater than 0".to_string(),
            )));
        }
        Ok(())
    }
}

fn default_change_buffer_size() -> usize {
    16
}
