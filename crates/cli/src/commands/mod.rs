//! Subcommand implementations.

pub mod create_user;
pub mod init_db;
pub mod onboard;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::Context;
use isenior_config::AppConfig;
use isenior_store::SqliteStore;

/// Resolve the config file: `--config`, else `~/.isenior/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load the config with environment overrides applied.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = config_path(explicit);
    let config = AppConfig::load_with_env(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

pub async fn open_store(config: &AppConfig) -> anyhow::Result<SqliteStore> {
    SqliteStore::new(&config.database.path, config.database.max_connections)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))
}
