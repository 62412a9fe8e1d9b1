//! Persistent storage: SQLite task store and TOML configuration.

mod config;
pub mod task_db;

pub use config::{Config, MonitorSettings, NotificationsConfig};
pub use task_db::TaskDb;

use std::path::PathBuf;

/// Returns `~/.config/taskmaster[-dev]/` based on TASKMASTER_ENV.
///
/// Set TASKMASTER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TASKMASTER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("taskmaster-dev")
    } else {
        base_dir.join("taskmaster")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
