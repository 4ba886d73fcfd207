use serde::Deserialize;
use serde::Serialize;

/// Limits applied to a connection's resource registry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegistryConfig {
    /// Maximum number of live resources per connection (0 means unlimited)
    #[serde(default = "default_max_resources")]
    pub max_resources: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_resources: default_max_resources(),
        }
    }
}

fn default_max_resources() -> usize {
    1000
}
