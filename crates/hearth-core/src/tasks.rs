//! Shopping and to-do tasks, and recurring reminders.
//!
//! Restock alerts append shopping tasks, announcements summarize today's
//! pending tasks and reminders, and the watch loop speaks each one at its
//! due time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

fn unknown(field: &str, value: &str, expected: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message: format!("'{value}' is not one of {expected}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Todo,
    Shopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }

    /// Traffic-light marker used in chat messages.
    pub fn marker(&self) -> &'static str {
        match self {
            TaskPriority::High => "🔴",
            TaskPriority::Medium => "🟡",
            TaskPriority::Low => "🟢",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(TaskPriority::High),
            "medium" => Ok(TaskPriority::Medium),
            "low" => Ok(TaskPriority::Low),
            _ => Err(unknown("priority", s, "high, medium, low")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub task: String,
    pub due_date: NaiveDate,
    /// `HH:MM`
    pub due_time: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Pending to-do (or shopping) item due at `due_time` on `due_date`.
    pub fn new(
        kind: TaskKind,
        task: impl Into<String>,
        due_date: NaiveDate,
        due_time: impl Into<String>,
        priority: TaskPriority,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("task-{}", Uuid::new_v4()),
            kind,
            task: task.into(),
            due_date,
            due_time: due_time.into(),
            priority,
            status: TaskStatus::Pending,
            created_at: now,
        }
    }

    /// Urgent shopping task for an ingredient that blocks every meal.
    pub fn urgent_purchase(item: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("task-{}", Uuid::new_v4()),
            kind: TaskKind::Shopping,
            task: format!("🚨 URGENT: Buy {item}"),
            due_date: now.date_naive(),
            due_time: now.format("%H:%M").to_string(),
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            created_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Basket for shopping items, check mark for everything else.
    pub fn icon(&self) -> &'static str {
        match self.kind {
            TaskKind::Shopping => "🛒",
            TaskKind::Todo => "✅",
        }
    }
}

/// Pending tasks due on `today`.
pub fn todays_tasks(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.is_pending() && t.due_date == today)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderCategory {
    Home,
    Health,
    Work,
    Personal,
}

impl ReminderCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            ReminderCategory::Home => "🏠",
            ReminderCategory::Health => "🏥",
            ReminderCategory::Work => "💼",
            ReminderCategory::Personal => "👤",
        }
    }
}

impl FromStr for ReminderCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(ReminderCategory::Home),
            "health" => Ok(ReminderCategory::Health),
            "work" => Ok(ReminderCategory::Work),
            "personal" => Ok(ReminderCategory::Personal),
            _ => Err(unknown("category", s, "home, health, work, personal")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for ReminderFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReminderFrequency::Daily => "daily",
            ReminderFrequency::Weekly => "weekly",
            ReminderFrequency::Monthly => "monthly",
        })
    }
}

impl FromStr for ReminderFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(ReminderFrequency::Daily),
            "weekly" => Ok(ReminderFrequency::Weekly),
            "monthly" => Ok(ReminderFrequency::Monthly),
            _ => Err(unknown("frequency", s, "daily, weekly, monthly")),
        }
    }
}

/// A recurring reminder. `next_due` is the local date of its next
/// occurrence; it moves forward once that occurrence has been delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub task: String,
    pub category: ReminderCategory,
    pub frequency: ReminderFrequency,
    /// `HH:MM`
    pub due_time: String,
    pub next_due: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    pub fn new(
        task: impl Into<String>,
        category: ReminderCategory,
        frequency: ReminderFrequency,
        due_time: impl Into<String>,
        next_due: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("reminder-{}", Uuid::new_v4()),
            task: task.into(),
            category,
            frequency,
            due_time: due_time.into(),
            next_due,
            created_at: now,
        }
    }

    /// Move `next_due` one period forward. Monthly reminders keep their day
    /// of month where it exists and clamp to the month's last day otherwise.
    pub fn advance(&mut self) {
        let next = match self.frequency {
            ReminderFrequency::Daily => self.next_due.checked_add_days(Days::new(1)),
            ReminderFrequency::Weekly => self.next_due.checked_add_days(Days::new(7)),
            ReminderFrequency::Monthly => self.next_due.checked_add_months(Months::new(1)),
        };
        if let Some(next) = next {
            self.next_due = next;
        }
    }

    /// Advance an occurrence missed on an earlier day to the first one on or
    /// after `today`. Returns true if `next_due` changed.
    pub fn catch_up(&mut self, today: NaiveDate) -> bool {
        let start = self.next_due;
        while self.next_due < today {
            let before = self.next_due;
            self.advance();
            if self.next_due == before {
                break;
            }
        }
        self.next_due != start
    }
}

/// Reminders whose next occurrence is `today`.
pub fn todays_reminders(reminders: &[Reminder], today: NaiveDate) -> Vec<&Reminder> {
    reminders.iter().filter(|r| r.next_due == today).collect()
}
