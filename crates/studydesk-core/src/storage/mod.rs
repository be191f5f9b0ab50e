mod config;
pub mod database;
pub mod timer_store;

pub use config::{Config, CueKind, NotificationsConfig, TimerConfig};
pub use database::Database;
pub use timer_store::{TimerStore, TIMERS_KEY};

use std::path::PathBuf;

use crate::error::PersistenceError;

/// Returns the directory holding the database and config file.
///
/// `STUDYDESK_DATA_DIR` wins when set. Otherwise `~/.config/studydesk[-dev]/`
/// based on `STUDYDESK_ENV` (set it to `dev` for a development data directory).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, PersistenceError> {
    let dir = match std::env::var_os("STUDYDESK_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STUDYDESK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("studydesk-dev")
            } else {
                base_dir.join("studydesk")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| PersistenceError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
