//! Voice and Telegram announcements built from the household state.
//!
//! - [`content`]: spoken text
//! - [`telegram`]: Markdown chat messages
//! - [`schedule`]: daily `HH:MM` scheduling

pub mod content;
pub mod schedule;
pub mod telegram;

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::pantry::{low_stock_items, DailyMenu, FoodMenu, Stock};
use crate::tasks::{todays_reminders, todays_tasks, Reminder, Task};

pub use schedule::{AnnouncementPlanner, Channel, DueAnnouncement, DueItem, DueReminder, PlannedJob};

pub(crate) fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Sections an announcement schedule can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Greeting,
    MenuToday,
    MenuTomorrow,
    Tasks,
    Reminders,
    LowStock,
    RestockAlert,
}

impl FromStr for ContentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greeting" => Ok(ContentType::Greeting),
            "menu_today" => Ok(ContentType::MenuToday),
            "menu_tomorrow" => Ok(ContentType::MenuTomorrow),
            "tasks" => Ok(ContentType::Tasks),
            "reminders" => Ok(ContentType::Reminders),
            "low_stock" => Ok(ContentType::LowStock),
            "restock_alert" => Ok(ContentType::RestockAlert),
            other => Err(ValidationError::InvalidValue {
                field: "content_types".into(),
                message: format!("unknown content type '{other}'"),
            }),
        }
    }
}

/// Parse configured content types, dropping names we do not know.
pub fn parse_content_types(names: &[String]) -> Vec<ContentType> {
    names
        .iter()
        .filter_map(|name| match name.parse() {
            Ok(t) => Some(t),
            Err(_) => {
                debug!(content_type = %name, "ignoring unknown content type");
                None
            }
        })
        .collect()
}

/// Everything an announcement may mention, captured at one moment.
#[derive(Debug, Clone, Copy)]
pub struct Briefing<'a> {
    pub user_name: &'a str,
    /// Local wall-clock time the announcement is for.
    pub now: NaiveDateTime,
    pub today_menu: &'a DailyMenu,
    pub tomorrow_menu: &'a DailyMenu,
    pub tasks: &'a [Task],
    pub reminders: &'a [Reminder],
    pub stock: &'a Stock,
    pub food: &'a FoodMenu,
}

impl Briefing<'_> {
    pub fn hour(&self) -> u32 {
        self.now.hour()
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn todays_tasks(&self) -> Vec<&Task> {
        todays_tasks(self.tasks, self.today())
    }

    pub fn todays_reminders(&self) -> Vec<&Reminder> {
        todays_reminders(self.reminders, self.today())
    }
}

/// Which Telegram message a schedule's content types select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelegramKind {
    DailyUpdate,
    LowStockAlert,
    TaskReminder,
    MenuUpdate,
    RestockAlert,
}

impl TelegramKind {
    /// Menu and tasks together make a daily update; otherwise the first
    /// matching single-topic message wins.
    pub fn select(content: &[ContentType]) -> Option<Self> {
        let has = |t| content.contains(&t);
        if has(ContentType::MenuToday) && has(ContentType::Tasks) {
            Some(TelegramKind::DailyUpdate)
        } else if has(ContentType::LowStock) {
            Some(TelegramKind::LowStockAlert)
        } else if has(ContentType::Tasks) {
            Some(TelegramKind::TaskReminder)
        } else if has(ContentType::MenuToday) || has(ContentType::MenuTomorrow) {
            Some(TelegramKind::MenuUpdate)
        } else if has(ContentType::RestockAlert) {
            Some(TelegramKind::RestockAlert)
        } else {
            None
        }
    }
}

/// Spoken text for a schedule.
pub fn voice_message(briefing: &Briefing<'_>, content: &[ContentType]) -> String {
    content::full_announcement(briefing, content)
}

/// Telegram text for a schedule, or `None` when there is nothing to send.
pub fn telegram_message(briefing: &Briefing<'_>, content: &[ContentType]) -> Option<String> {
    match TelegramKind::select(content)? {
        TelegramKind::DailyUpdate => Some(telegram::daily_update(
            briefing.today_menu,
            &briefing.todays_tasks(),
            &briefing.todays_reminders(),
            &low_stock_items(briefing.stock),
        )),
        TelegramKind::LowStockAlert => Some(telegram::low_stock_alert(&low_stock_items(
            briefing.stock,
        ))),
        TelegramKind::TaskReminder => Some(telegram::task_reminder(&briefing.todays_tasks())),
        TelegramKind::MenuUpdate => Some(telegram::menu_update(
            briefing.today_menu,
            briefing.tomorrow_menu,
        )),
        TelegramKind::RestockAlert => telegram::restock_alert(briefing.food, briefing.stock),
    }
}
