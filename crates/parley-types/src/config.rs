//! Client configuration for Parley.

use serde::{Deserialize, Serialize};

/// Default agent service endpoint, used when neither the environment
/// nor `config.toml` provides one.
pub const DEFAULT_ENDPOINT: &str = "https://sabahat12-refund-agent.hf.space/refund";

/// Client configuration loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Agent service endpoint to POST messages to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_fixed_endpoint() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_missing_endpoint_field_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }
}
