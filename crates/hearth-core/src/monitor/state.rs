//! Persisted monitor state and timer configuration.
//!
//! The JSON layout (`isConnected`, `currentSSID`, `timers.timer1.triggerTime`, ...)
//! matches what earlier versions of the monitor stored, so saved state
//! round-trips unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The two countdowns armed from the first connection of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerSlot {
    Timer1,
    Timer2,
}

impl TimerSlot {
    pub const ALL: [TimerSlot; 2] = [TimerSlot::Timer1, TimerSlot::Timer2];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerSlot::Timer1 => "timer1",
            TimerSlot::Timer2 => "timer2",
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            TimerSlot::Timer1 => 1,
            TimerSlot::Timer2 => 2,
        }
    }
}

impl fmt::Display for TimerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one timer within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Armed,
    Fired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub active: bool,
    /// Epoch milliseconds.
    pub trigger_time: Option<i64>,
    pub triggered: bool,
}

impl TimerState {
    pub fn phase(&self) -> TimerPhase {
        if self.triggered {
            TimerPhase::Fired
        } else if self.active {
            TimerPhase::Armed
        } else {
            TimerPhase::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timers {
    pub timer1: TimerState,
    pub timer2: TimerState,
}

impl Timers {
    pub fn get(&self, slot: TimerSlot) -> &TimerState {
        match slot {
            TimerSlot::Timer1 => &self.timer1,
            TimerSlot::Timer2 => &self.timer2,
        }
    }

    pub fn get_mut(&mut self, slot: TimerSlot) -> &mut TimerState {
        match slot {
            TimerSlot::Timer1 => &mut self.timer1,
            TimerSlot::Timer2 => &mut self.timer2,
        }
    }
}

/// Everything the monitor persists between runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorState {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default, rename = "currentSSID")]
    pub current_ssid: Option<String>,
    #[serde(default)]
    pub last_connection_time: Option<i64>,
    #[serde(default)]
    pub first_connection_today: Option<i64>,
    #[serde(default)]
    pub timers: Timers,
}

/// The first qualifying connection, tagged with the day it was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstConnectionRecord {
    pub date: NaiveDate,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// One row of connection history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEvent {
    pub timestamp: i64,
    pub ssid: String,
    pub is_first_of_day: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Hours,
    Minutes,
    Seconds,
}

impl DurationUnit {
    pub fn millis(&self) -> i64 {
        match self {
            DurationUnit::Hours => 60 * 60 * 1000,
            DurationUnit::Minutes => 60 * 1000,
            DurationUnit::Seconds => 1000,
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            DurationUnit::Hours => "hour",
            DurationUnit::Minutes => "minute",
            DurationUnit::Seconds => "second",
        }
    }
}

impl FromStr for DurationUnit {
    type Err = ValidationError;

    /// Unknown units fall back to hours.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "minutes" | "minute" | "min" | "m" => DurationUnit::Minutes,
            "seconds" | "second" | "sec" | "s" => DurationUnit::Seconds,
            _ => DurationUnit::Hours,
        })
    }
}

/// A countdown length such as "7 hours".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDuration {
    pub amount: u64,
    pub unit: DurationUnit,
}

impl TimerDuration {
    pub fn hours(amount: u64) -> Self {
        Self {
            amount,
            unit: DurationUnit::Hours,
        }
    }

    pub fn millis(&self) -> i64 {
        i64::try_from(self.amount)
            .unwrap_or(i64::MAX)
            .saturating_mul(self.unit.millis())
    }
}

impl fmt::Display for TimerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.amount == 1 { "" } else { "s" };
        write!(f, "{} {}{}", self.amount, self.unit.noun(), plural)
    }
}

/// What the monitor needs to know from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub target_ssid: String,
    pub timer1: TimerDuration,
    pub timer2: TimerDuration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target_ssid: "DefaultWiFi".into(),
            timer1: TimerDuration::hours(7),
            timer2: TimerDuration::hours(8),
        }
    }
}

impl MonitorConfig {
    pub fn duration(&self, slot: TimerSlot) -> TimerDuration {
        match slot {
            TimerSlot::Timer1 => self.timer1,
            TimerSlot::Timer2 => self.timer2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_durations_saturate() {
        let forever = TimerDuration {
            amount: u64::MAX,
            unit: DurationUnit::Seconds,
        };
        assert_eq!(forever.millis(), i64::MAX);
        assert_eq!(TimerDuration::hours(u64::MAX / 2).millis(), i64::MAX);
        assert_eq!(TimerDuration::hours(2).millis(), 2 * 60 * 60 * 1000);
    }

    #[test]
    fn state_json_uses_original_field_names() {
        let mut state = MonitorState::default();
        state.current_ssid = Some("Home".into());
        state.timers.timer1 = TimerState {
            active: true,
            trigger_time: Some(1_000),
            triggered: false,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentSSID"], "Home");
        assert_eq!(json["isConnected"], false);
        assert_eq!(json["timers"]["timer1"]["triggerTime"], 1_000);
        assert!(json["timers"]["timer2"]["triggerTime"].is_null());

        let back: MonitorState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn phase_follows_flags() {
        assert_eq!(TimerState::default().phase(), TimerPhase::Idle);
        let armed = TimerState {
            active: true,
            trigger_time: Some(5),
            triggered: false,
        };
        assert_eq!(armed.phase(), TimerPhase::Armed);
        let fired = TimerState {
            active: false,
            trigger_time: Some(5),
            triggered: true,
        };
        assert_eq!(fired.phase(), TimerPhase::Fired);
    }

    #[test]
    fn durations_convert_and_print() {
        assert_eq!(TimerDuration::hours(7).millis(), 7 * 3_600_000);
        let d = TimerDuration {
            amount: 1,
            unit: "minutes".parse().unwrap(),
        };
        assert_eq!(d.millis(), 60_000);
        assert_eq!(d.to_string(), "1 minute");
        assert_eq!(TimerDuration::hours(8).to_string(), "8 hours");
        assert_eq!("fortnights".parse::<DurationUnit>().unwrap(), DurationUnit::Hours);
    }
}
