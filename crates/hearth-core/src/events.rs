use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::monitor::TimerSlot;
use crate::pantry::MealType;

/// Every state change in the system produces an Event.
/// The CLI prints them; the dispatcher turns some into notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// First qualifying connection of the day; timers are armed from `at`.
    FirstConnection {
        ssid: String,
        at: DateTime<Utc>,
    },
    /// Target network seen again after a disconnect on the same day.
    Reconnected {
        ssid: String,
        at: DateTime<Utc>,
    },
    Disconnected {
        at: DateTime<Utc>,
    },
    TimerArmed {
        timer: TimerSlot,
        trigger_at: DateTime<Utc>,
    },
    /// Trigger time was already in the past when arming; the timer stays idle.
    TimerSkipped {
        timer: TimerSlot,
        trigger_at: DateTime<Utc>,
    },
    TimerFired {
        timer: TimerSlot,
        trigger_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    FirstConnectionOverridden {
        first_connection: DateTime<Utc>,
    },
    DailyDataCleared {
        at: DateTime<Utc>,
    },
    /// A stored first-connection record from an earlier day was discarded.
    StaleDayDiscarded {
        date: NaiveDate,
    },
    MealRotated {
        date: NaiveDate,
        meal: MealType,
        from: String,
        to: String,
    },
    DishCooked {
        meal: MealType,
        dish: String,
        at: DateTime<Utc>,
    },
    /// No meal can be prepared anymore.
    RestockNeeded {
        missing_items: Vec<String>,
        at: DateTime<Utc>,
    },
    AnnouncementDue {
        schedule_id: String,
        at: DateTime<Utc>,
    },
    /// A task or recurring reminder reached its due time.
    ReminderDue {
        id: String,
        task: String,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged() {
        let at = DateTime::from_timestamp_millis(0).unwrap();
        let event = Event::TimerFired {
            timer: TimerSlot::Timer2,
            trigger_at: at,
            at,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerFired");
        assert_eq!(json["timer"], "timer2");
        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
