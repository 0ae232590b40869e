//! Client configuration loader for Parley.
//!
//! Reads `config.toml` from the data directory (`~/.parley/` in production)
//! and deserializes it into [`ClientConfig`]. Falls back to the built-in
//! default when the file is missing or malformed.

use std::path::Path;

use parley_types::config::ClientConfig;

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Resolve the agent endpoint.
///
/// Priority:
/// 1. `PARLEY_ENDPOINT` environment variable
/// 2. `endpoint` from `config.toml`
/// 3. Built-in default
pub fn resolve_endpoint(config: &ClientConfig) -> String {
    endpoint_from(std::env::var("PARLEY_ENDPOINT").ok(), config)
}

fn endpoint_from(env_override: Option<String>, config: &ClientConfig) -> String {
    match env_override {
        Some(endpoint) if !endpoint.trim().is_empty() => endpoint,
        _ => config.endpoint.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::config::DEFAULT_ENDPOINT;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_client_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn load_client_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"endpoint = "http://localhost:9000/refund""#,
        )
        .await
        .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.endpoint, "http://localhost:9000/refund");
    }

    #[tokio::test]
    async fn load_client_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn endpoint_env_override_wins() {
        let config = ClientConfig {
            endpoint: "http://from-config/refund".into(),
        };
        let endpoint = endpoint_from(Some("http://from-env/refund".into()), &config);
        assert_eq!(endpoint, "http://from-env/refund");
    }

    #[test]
    fn endpoint_blank_override_falls_back_to_config() {
        let config = ClientConfig {
            endpoint: "http://from-config/refund".into(),
        };
        assert_eq!(
            endpoint_from(Some("   ".into()), &config),
            "http://from-config/refund"
        );
        assert_eq!(endpoint_from(None, &config), "http://from-config/refund");
    }
}
