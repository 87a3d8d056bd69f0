pub mod alert;
pub mod announce;
pub mod config;
pub mod menu;
pub mod monitor;
pub mod reminder;
pub mod stock;
pub mod task;

use std::error::Error;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use hearth_core::notify::ConsoleNotifier;
use hearth_core::storage::{Config, Database, HouseholdStore};
use hearth_core::Dispatcher;
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Config, store and notification sinks shared by the commands.
pub struct Context {
    pub config: Config,
    pub store: HouseholdStore<Database>,
    pub dispatcher: Dispatcher,
}

impl Context {
    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config = Config::load()?;
        let store = HouseholdStore::new(Database::open()?);
        let notifier = Arc::new(ConsoleNotifier::stderr(&config.notifications));
        let dispatcher = Dispatcher::from_config(&config, notifier);
        Ok(Self {
            config,
            store,
            dispatcher,
        })
    }
}

/// Menus and task due dates are keyed by the UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
