mod config;
pub mod database;
mod state;

pub use config::{
    AnnouncementSchedule, Config, HouseholdConfig, LogConfig, MonitorSection,
    NotificationsConfig, NutritionGoals, TelegramConfig, UserInfo, VoiceConfig,
};
pub use database::Database;
pub use state::{keys, HouseholdStore};

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, Result};

/// Returns the data directory, creating it if needed.
///
/// `HEARTH_DATA_DIR` wins when set. Otherwise `~/.config/hearth/`, or
/// `~/.config/hearth-dev/` when `HEARTH_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HEARTH_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HEARTH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("hearth-dev")
            } else {
                base_dir.join("hearth")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// String-keyed JSON document store.
pub trait KeyValueStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>>;
    fn save_raw(&self, key: &str, json: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Load and deserialize `key`. A missing key is `Ok(None)`.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.load_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.save_raw(key, &serde_json::to_string(value)?)
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save_raw(&self, key: &str, json: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
