mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, StoreConfig, TimerConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/grind[-dev]/` based on GRIND_ENV.
///
/// Set GRIND_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("GRIND_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("grind-dev")
    } else {
        base_dir.join("grind")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
