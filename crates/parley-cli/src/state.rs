//! Application state wiring the infrastructure together.

use std::path::PathBuf;

use parley_infra::config::{load_client_config, resolve_endpoint};
use parley_infra::sqlite::pool::{database_url, resolve_data_dir, DatabasePool};

/// Shared application state for CLI commands.
pub struct AppState {
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    pub endpoint: String,
}

impl AppState {
    /// Initialize the application state: connect to the DB, load config.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let config = load_client_config(&data_dir).await;
        let endpoint = resolve_endpoint(&config);

        Ok(Self {
            data_dir,
            db_pool,
            endpoint,
        })
    }
}
