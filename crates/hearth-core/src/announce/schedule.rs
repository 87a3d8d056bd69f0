//! Daily `HH:MM` announcement scheduling.
//!
//! Each enabled schedule is armed at its next local occurrence (today if
//! still ahead, otherwise tomorrow). When a job comes due it is handed back
//! to the caller and re-armed for the following day.
//!
//! Tasks and recurring reminders due today are armed separately as one-shot
//! fires at their own `HH:MM`.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::events::Event;
use crate::monitor::{to_datetime, TimerScheduler};
use crate::storage::{AnnouncementSchedule, Config};
use crate::tasks::{todays_reminders, todays_tasks, Reminder, Task};

use super::{content, telegram};

/// Parse a strict `HH:MM` wall-clock time.
pub fn parse_hhmm(text: &str) -> Result<NaiveTime, ValidationError> {
    let invalid = || ValidationError::InvalidTime(text.to_string());
    let (h, m) = text.trim().split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || m.len() != 2 || h.len() > 2 {
        return Err(invalid());
    }
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// The first moment strictly after `now` whose local time is `time`.
///
/// Returns `None` only if the wall-clock time does not exist on the next
/// few days (a DST gap every day), which no real zone does.
pub fn next_occurrence<Tz: TimeZone>(time: NaiveTime, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    (0..3).find_map(|offset| {
        let naive = (today + Duration::days(offset)).and_time(time);
        tz.from_local_datetime(&naive)
            .earliest()
            .filter(|candidate| candidate > now)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Voice,
    Telegram,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Voice => "voice",
            Channel::Telegram => "telegram",
        })
    }
}

#[derive(Debug, Clone)]
struct Job {
    key: String,
    channel: Channel,
    schedule: AnnouncementSchedule,
    time: NaiveTime,
}

/// A job that reached its time.
#[derive(Debug, Clone, PartialEq)]
pub struct DueAnnouncement {
    pub channel: Channel,
    pub schedule: AnnouncementSchedule,
    pub at: DateTime<Utc>,
}

impl DueAnnouncement {
    pub fn event(&self) -> Event {
        Event::AnnouncementDue {
            schedule_id: format!("{}-{}", self.channel, self.schedule.id),
            at: self.at,
        }
    }
}

/// Pending upcoming job, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedJob {
    pub id: String,
    pub channel: Channel,
    pub name: String,
    pub next_run: DateTime<Utc>,
}

/// Something due at a time of day today.
#[derive(Debug, Clone, PartialEq)]
pub enum DueItem {
    Task(Task),
    Reminder(Reminder),
}

impl DueItem {
    pub fn id(&self) -> &str {
        match self {
            DueItem::Task(t) => &t.id,
            DueItem::Reminder(r) => &r.id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DueItem::Task(t) => &t.task,
            DueItem::Reminder(r) => &r.task,
        }
    }

    pub fn due_time(&self) -> &str {
        match self {
            DueItem::Task(t) => &t.due_time,
            DueItem::Reminder(r) => &r.due_time,
        }
    }

    pub fn voice_text(&self) -> String {
        match self {
            DueItem::Task(t) => content::task_due(t),
            DueItem::Reminder(r) => content::recurring_reminder(r),
        }
    }

    pub fn telegram_text(&self) -> String {
        match self {
            DueItem::Task(t) => telegram::task_due(t),
            DueItem::Reminder(r) => telegram::recurring_reminder(r),
        }
    }
}

/// A task or reminder that reached its time.
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub item: DueItem,
    pub at: DateTime<Utc>,
}

impl DueReminder {
    pub fn event(&self) -> Event {
        Event::ReminderDue {
            id: self.item.id().to_string(),
            task: self.item.text().to_string(),
            at: self.at,
        }
    }
}

#[derive(Debug, Default)]
pub struct AnnouncementPlanner {
    jobs: Vec<Job>,
    scheduler: TimerScheduler<String>,
    items: HashMap<String, DueItem>,
    item_scheduler: TimerScheduler<String>,
    /// Ids already warned about for an unparsable due time.
    invalid: HashSet<String>,
}

impl AnnouncementPlanner {
    /// Arm every enabled voice and Telegram schedule.
    ///
    /// Schedules with an unparsable time are skipped with a warning; the
    /// rest are still armed.
    pub fn from_config<Tz: TimeZone>(config: &Config, now: &DateTime<Tz>) -> Self {
        let mut planner = Self::default();
        if config.voice.enabled {
            for schedule in &config.voice.schedules {
                planner.add(Channel::Voice, schedule, now);
            }
        }
        if config.telegram.enabled {
            for schedule in &config.telegram.schedules {
                planner.add(Channel::Telegram, schedule, now);
            }
        }
        planner
    }

    /// Arm one schedule. Returns false if it was disabled or unparsable.
    pub fn add<Tz: TimeZone>(
        &mut self,
        channel: Channel,
        schedule: &AnnouncementSchedule,
        now: &DateTime<Tz>,
    ) -> bool {
        if !schedule.enabled {
            return false;
        }
        let time = match parse_hhmm(&schedule.time) {
            Ok(time) => time,
            Err(e) => {
                warn!(channel = %channel, id = %schedule.id, error = %e, "skipping announcement schedule");
                return false;
            }
        };
        let key = format!("{channel}-{}", schedule.id);
        self.jobs.retain(|j| j.key != key);
        self.jobs.push(Job {
            key: key.clone(),
            channel,
            schedule: schedule.clone(),
            time,
        });
        self.arm(&key, time, now);
        true
    }

    fn arm<Tz: TimeZone>(&mut self, key: &str, time: NaiveTime, now: &DateTime<Tz>) {
        match next_occurrence(time, now) {
            Some(at) => {
                debug!(job = key, at = %at.with_timezone(&Utc), "announcement armed");
                self.scheduler.schedule(key.to_string(), at.timestamp_millis());
            }
            None => warn!(job = key, "no next occurrence for announcement"),
        }
    }

    /// Jobs whose time has come, earliest first. Each is re-armed for its
    /// next occurrence after `now`.
    pub fn take_due<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Vec<DueAnnouncement> {
        let mut due = Vec::new();
        for fire in self.scheduler.take_due(now.timestamp_millis()) {
            let Some(job) = self.jobs.iter().find(|j| j.key == fire.key).cloned() else {
                continue;
            };
            due.push(DueAnnouncement {
                channel: job.channel,
                schedule: job.schedule,
                at: to_datetime(fire.fire_at),
            });
            self.arm(&job.key, job.time, now);
        }
        due
    }

    /// Arm pending tasks and reminders due today at their `HH:MM`.
    ///
    /// Call on every poll with the current lists. Only times still ahead of
    /// `now` are armed; a fire already due stays pending until taken. Items
    /// no longer due today (completed, deleted, moved) are dropped, and
    /// items with an unparsable time are skipped with a warning.
    pub fn arm_reminders<Tz: TimeZone>(
        &mut self,
        tasks: &[Task],
        reminders: &[Reminder],
        now: &DateTime<Tz>,
    ) {
        let today = now.date_naive();
        let current: Vec<DueItem> = todays_tasks(tasks, today)
            .into_iter()
            .cloned()
            .map(DueItem::Task)
            .chain(
                todays_reminders(reminders, today)
                    .into_iter()
                    .cloned()
                    .map(DueItem::Reminder),
            )
            .collect();

        let live: HashSet<&str> = current.iter().map(DueItem::id).collect();
        let gone: Vec<String> = self
            .items
            .keys()
            .filter(|id| !live.contains(id.as_str()))
            .cloned()
            .collect();
        for id in gone {
            debug!(item = %id, "reminder no longer due today");
            self.item_scheduler.cancel(&id);
            self.items.remove(&id);
        }

        let tz = now.timezone();
        let now_ms = now.timestamp_millis();
        for item in current {
            let id = item.id().to_string();
            let time = match parse_hhmm(item.due_time()) {
                Ok(time) => time,
                Err(e) => {
                    if self.invalid.insert(id.clone()) {
                        warn!(item = %id, error = %e, "skipping reminder");
                    }
                    continue;
                }
            };
            let Some(at) = tz.from_local_datetime(&today.and_time(time)).earliest() else {
                continue;
            };
            let fire_at = at.timestamp_millis();
            let pending = self.item_scheduler.pending(&id).map(|f| f.fire_at);
            if fire_at > now_ms {
                if pending != Some(fire_at) {
                    debug!(item = %id, at = %at.with_timezone(&Utc), "reminder armed");
                    self.item_scheduler.schedule(id.clone(), fire_at);
                }
                self.items.insert(id, item);
            } else if pending.is_some() {
                self.items.insert(id, item);
            }
        }
    }

    /// Tasks and reminders whose time has come, earliest first. Each fires
    /// once; it is not re-armed.
    pub fn take_due_reminders<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Vec<DueReminder> {
        self.item_scheduler
            .take_due(now.timestamp_millis())
            .into_iter()
            .filter_map(|fire| {
                let item = self.items.remove(&fire.key)?;
                Some(DueReminder {
                    item,
                    at: to_datetime(fire.fire_at),
                })
            })
            .collect()
    }

    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.scheduler.next_fire_at().map(to_datetime)
    }

    /// Upcoming jobs ordered by next run.
    pub fn planned(&self) -> Vec<PlannedJob> {
        let mut planned: Vec<PlannedJob> = self
            .jobs
            .iter()
            .filter_map(|job| {
                let fire = self.scheduler.pending(&job.key)?;
                Some(PlannedJob {
                    id: job.key.clone(),
                    channel: job.channel,
                    name: job.schedule.name.clone(),
                    next_run: to_datetime(fire.fire_at),
                })
            })
            .collect();
        planned.sort_by_key(|j| j.next_run);
        planned
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
