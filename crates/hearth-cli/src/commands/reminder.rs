use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use hearth_core::announce::schedule::parse_hhmm;
use hearth_core::tasks::{todays_reminders, Reminder, ReminderCategory, ReminderFrequency};
use serde_json::json;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// List recurring reminders
    List {
        /// Only those due today
        #[arg(long)]
        today: bool,
    },
    /// Add a recurring reminder
    Add {
        /// What to be reminded of
        task: String,
        /// Time of day, HH:MM
        #[arg(long, default_value = "09:00")]
        at: String,
        /// home, health, work or personal
        #[arg(long, default_value = "home")]
        category: ReminderCategory,
        /// daily, weekly or monthly
        #[arg(long, default_value = "daily")]
        frequency: ReminderFrequency,
        /// First occurrence, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        starts: Option<NaiveDate>,
    },
    /// Delete a reminder
    Remove {
        /// Reminder id as shown by `reminder list`
        id: String,
    },
}

pub async fn run(action: ReminderAction) -> CliResult {
    let ctx = Context::load()?;
    let today = Local::now().date_naive();
    match action {
        ReminderAction::List { today: only_today } => {
            let reminders = ctx.store.reminders()?;
            if only_today {
                print_json(&todays_reminders(&reminders, today))?;
            } else {
                print_json(&reminders)?;
            }
        }
        ReminderAction::Add {
            task,
            at,
            category,
            frequency,
            starts,
        } => {
            parse_hhmm(&at)?;
            let reminder = Reminder::new(
                task,
                category,
                frequency,
                at,
                starts.unwrap_or(today),
                Utc::now(),
            );
            let mut reminders = ctx.store.reminders()?;
            reminders.push(reminder.clone());
            ctx.store.save_reminders(&reminders)?;
            print_json(&reminder)?;
        }
        ReminderAction::Remove { id } => {
            if !ctx.store.remove_reminder(&id)? {
                return Err(format!("no reminder with id '{id}'").into());
            }
            print_json(&json!({ "removed": id }))?;
        }
    }
    Ok(())
}
