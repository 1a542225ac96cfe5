mod config;
pub mod kv;
pub mod pages_blob;
pub mod write_queue;

pub use config::Config;
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use pages_blob::{decode_pages, encode_pages, PAGES_BLOB_VERSION};
pub use write_queue::{StorageWarning, WriteQueue};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Storage key for the daily page collection.
pub const DAILY_PAGES_KEY: &str = "daily_pages";
/// Storage key for the goal lists.
pub const GOALS_KEY: &str = "goals";
/// Storage key for 90-day plans.
pub const PLANS_KEY: &str = "plans_90day";
/// Storage key for weekly reviews.
pub const WEEKLY_REVIEWS_KEY: &str = "weekly_reviews";
/// Storage key for the user profile.
pub const USER_PROFILE_KEY: &str = "user_profile";
/// Storage key for settings.
pub const SETTINGS_KEY: &str = "settings";
/// Storage key for habits.
pub const HABITS_KEY: &str = "habits";

/// Every key this application writes, in export order.
pub const ALL_KEYS: [&str; 7] = [
    DAILY_PAGES_KEY,
    GOALS_KEY,
    PLANS_KEY,
    WEEKLY_REVIEWS_KEY,
    USER_PROFILE_KEY,
    SETTINGS_KEY,
    HABITS_KEY,
];

/// Returns the data directory, creating it if needed.
///
/// `PARETOJOURNAL_DATA_DIR` wins when set. Otherwise the directory is
/// `~/.config/paretojournal[-dev]/`, with `PARETOJOURNAL_ENV=dev` selecting
/// the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("PARETOJOURNAL_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("PARETOJOURNAL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("paretojournal-dev")
            } else {
                base_dir.join("paretojournal")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
