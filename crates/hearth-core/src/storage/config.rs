//! TOML-based application configuration.
//!
//! Stores:
//! - Monitor settings (target network, timer durations, probe)
//! - Notification preferences
//! - Household nutrition goals and names
//! - Voice and Telegram announcement schedules
//! - Log level
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::monitor::{DurationUnit, MonitorConfig, TimerDuration};

/// WiFi monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSection {
    #[serde(default = "default_target_ssid")]
    pub target_ssid: String,
    #[serde(default = "default_timer1")]
    pub timer1_duration: u64,
    #[serde(default = "default_timer2")]
    pub timer2_duration: u64,
    /// `hours`, `minutes` or `seconds`. Anything else means hours.
    #[serde(default = "default_duration_unit")]
    pub duration_unit: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Command that prints the current SSID.
    #[serde(default = "default_probe_command")]
    pub probe_command: String,
    /// Simulate connectivity instead of probing.
    #[serde(default)]
    pub mock_mode: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub sound: bool,
    /// Custom sound played with timer notifications (optional).
    #[serde(default)]
    pub sound_file: Option<String>,
}

/// Daily protein and fiber targets in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoals {
    pub user_protein: f64,
    pub user_fiber: f64,
    pub spouse_protein: f64,
    pub spouse_fiber: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_name: String,
    pub spouse_name: String,
    pub user_weight: f64,
    pub spouse_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HouseholdConfig {
    #[serde(default)]
    pub nutrition_goals: NutritionGoals,
    #[serde(default)]
    pub user_info: UserInfo,
}

/// One timed announcement, voice or Telegram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementSchedule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `greeting`, `menu_today`, `menu_tomorrow`, `tasks`, `low_stock`,
    /// `restock_alert`.
    #[serde(default)]
    pub content_types: Vec<String>,
}

impl AnnouncementSchedule {
    fn new(id: &str, name: &str, time: &str, enabled: bool, content_types: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            time: time.into(),
            enabled,
            content_types: content_types.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Spoken announcements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Text-to-speech program; the text is passed as its last argument.
    #[serde(default = "default_voice_command")]
    pub command: String,
    #[serde(default = "default_voice_schedules")]
    pub schedules: Vec<AnnouncementSchedule>,
}

/// Telegram bot delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_telegram_schedules")]
    pub schedules: Vec<AnnouncementSchedule>,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub household: HouseholdConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// Default functions
fn default_target_ssid() -> String {
    "DefaultWiFi".into()
}
fn default_timer1() -> u64 {
    7
}
fn default_timer2() -> u64 {
    8
}
fn default_duration_unit() -> String {
    "hours".into()
}
fn default_poll_interval() -> u64 {
    5
}
fn default_probe_command() -> String {
    "iwgetid -r".into()
}
fn default_true() -> bool {
    true
}
fn default_voice_command() -> String {
    "espeak".into()
}
fn default_api_base() -> String {
    "https://api.telegram.org".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_voice_schedules() -> Vec<AnnouncementSchedule> {
    vec![
        AnnouncementSchedule::new(
            "morning",
            "Morning Update",
            "07:00",
            true,
            &["greeting", "menu_today", "tasks", "reminders"],
        ),
        AnnouncementSchedule::new("lunch", "Lunch Reminder", "12:30", true, &["menu_today"]),
        AnnouncementSchedule::new(
            "evening",
            "Evening Update",
            "18:00",
            true,
            &["menu_tomorrow", "low_stock", "tasks"],
        ),
    ]
}
fn default_telegram_schedules() -> Vec<AnnouncementSchedule> {
    vec![AnnouncementSchedule::new(
        "daily_update",
        "Daily Update",
        "08:00",
        false,
        &["menu_today", "tasks", "low_stock"],
    )]
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            target_ssid: default_target_ssid(),
            timer1_duration: default_timer1(),
            timer2_duration: default_timer2(),
            duration_unit: default_duration_unit(),
            poll_interval_secs: default_poll_interval(),
            probe_command: default_probe_command(),
            mock_mode: false,
        }
    }
}

impl MonitorSection {
    pub fn unit(&self) -> DurationUnit {
        self.duration_unit.parse().unwrap_or_default()
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        let unit = self.unit();
        MonitorConfig {
            target_ssid: self.target_ssid.clone(),
            timer1: TimerDuration {
                amount: self.timer1_duration,
                unit,
            },
            timer2: TimerDuration {
                amount: self.timer2_duration,
                unit,
            },
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            sound_file: None,
        }
    }
}

impl Default for NutritionGoals {
    fn default() -> Self {
        Self {
            user_protein: 60.0,
            user_fiber: 25.0,
            spouse_protein: 45.0,
            spouse_fiber: 20.0,
        }
    }
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            user_name: "User".into(),
            spouse_name: "Spouse".into(),
            user_weight: 71.0,
            spouse_weight: 55.0,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_voice_command(),
            schedules: default_voice_schedules(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_api_base(),
            schedules: default_telegram_schedules(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn morning_announcement_includes_reminders() {
        let cfg = Config::default();
        let morning = cfg.voice.schedules.iter().find(|s| s.id == "morning").unwrap();
        assert_eq!(morning.time, "07:00");
        assert_eq!(
            morning.content_types,
            ["greeting", "menu_today", "tasks", "reminders"]
        );
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[monitor]\ntarget_ssid = \"HomeNet\"\n").unwrap();
        assert_eq!(parsed.monitor.target_ssid, "HomeNet");
        assert_eq!(parsed.monitor.timer1_duration, 7);
        assert_eq!(parsed.voice.schedules.len(), 3);
        assert!(!parsed.telegram.enabled);
        assert_eq!(parsed.log.level, "info");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("monitor.target_ssid").as_deref(), Some("DefaultWiFi"));
        assert_eq!(cfg.get("monitor.timer2_duration").as_deref(), Some("8"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert!(cfg.get("monitor.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("monitor.target_ssid", "HomeNet").unwrap();
        cfg.set("monitor.timer1_duration", "2").unwrap();
        cfg.set("monitor.mock_mode", "true").unwrap();
        cfg.set("household.nutrition_goals.user_protein", "72.5").unwrap();
        cfg.set("notifications.sound_file", "/tmp/ding.wav").unwrap();
        assert_eq!(cfg.monitor.target_ssid, "HomeNet");
        assert_eq!(cfg.monitor.timer1_duration, 2);
        assert!(cfg.monitor.mock_mode);
        assert_eq!(cfg.household.nutrition_goals.user_protein, 72.5);
        assert_eq!(cfg.notifications.sound_file.as_deref(), Some("/tmp/ding.wav"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("monitor.nonexistent", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("monitor.mock_mode", "sometimes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("monitor.timer1_duration", "soon").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn monitor_config_uses_unit() {
        let mut cfg = Config::default();
        cfg.monitor.duration_unit = "minutes".into();
        let mc = cfg.monitor.monitor_config();
        assert_eq!(mc.timer1.millis(), 7 * 60_000);
        cfg.monitor.duration_unit = "weeks".into();
        assert_eq!(cfg.monitor.unit(), DurationUnit::Hours);
    }

    #[test]
    fn telegram_needs_credentials() {
        let mut t = TelegramConfig::default();
        assert!(!t.is_configured());
        t.enabled = true;
        t.bot_token = "123:abc".into();
        assert!(!t.is_configured());
        t.chat_id = "42".into();
        assert!(t.is_configured());
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("voice.command", "say").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().voice.command, "say");
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[monitor\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
