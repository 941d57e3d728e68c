//! Configuration loading for SkyNet.
//!
//! Resolves the data directory, reads `config.toml` from it into
//! [`AppConfig`], and picks the database URL. A missing or malformed config
//! file falls back to defaults.

use std::path::{Path, PathBuf};

use skynet_types::config::AppConfig;

use crate::sqlite::pool::default_database_url;

/// Resolve the data directory.
///
/// Uses `SKYNET_DATA_DIR` if set, otherwise `~/.skynet`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SKYNET_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|h| h.join(".skynet"))
        .unwrap_or_else(|| PathBuf::from(".skynet"))
}

/// Database URL: `DATABASE_URL` if set, otherwise `skynet.db` in the data dir.
pub fn database_url(data_dir: &Path) -> String {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => default_database_url(data_dir),
    }
}

/// Optional directory holding the static web UI.
pub fn web_dir() -> Option<PathBuf> {
    std::env::var("SKYNET_WEB_DIR").ok().map(PathBuf::from)
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}
