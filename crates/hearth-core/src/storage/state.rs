//! Typed access to the household documents kept in a [`KeyValueStore`].

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::KeyValueStore;
use crate::error::Result;
use crate::monitor::{FirstConnectionRecord, MonitorState};
use crate::pantry::{FoodMenu, MenuPlan, RestockMonitor, Stock};
use crate::tasks::{Reminder, Task, TaskStatus};

/// Storage keys. The names match earlier saved data.
pub mod keys {
    pub const STOCK: &str = "stock";
    pub const FOOD_MENU: &str = "food_menu";
    pub const DAILY_MENUS: &str = "daily_menus";
    pub const TASKS: &str = "tasks";
    pub const REMINDERS: &str = "reminders";
    pub const MONITOR_STATE: &str = "wifi_monitor_state";
    pub const FIRST_CONNECTION: &str = "first_connection_today";
    pub const RESTOCK_MONITOR: &str = "restock_monitor";
}

pub struct HouseholdStore<S> {
    store: S,
}

impl<S: KeyValueStore> HouseholdStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.store.load_json(key)?.unwrap_or_default())
    }

    pub fn stock(&self) -> Result<Stock> {
        self.load_or_default(keys::STOCK)
    }

    /// Save the stock after checking no ingredient is in both partitions.
    pub fn save_stock(&self, stock: &Stock) -> Result<()> {
        stock.validate()?;
        self.store.save_json(keys::STOCK, stock)
    }

    pub fn food_menu(&self) -> Result<FoodMenu> {
        self.load_or_default(keys::FOOD_MENU)
    }

    pub fn save_food_menu(&self, food: &FoodMenu) -> Result<()> {
        self.store.save_json(keys::FOOD_MENU, food)
    }

    /// The menu plan, with today and tomorrow guaranteed present.
    ///
    /// A household with no saved plan gets the starter menus, which are
    /// written back immediately.
    pub fn menu_plan(&self, today: NaiveDate) -> Result<MenuPlan> {
        let mut plan: MenuPlan = self.load_or_default(keys::DAILY_MENUS)?;
        if plan.ensure_days(today) {
            debug!(%today, "filled in missing daily menus");
            self.save_menu_plan(&plan)?;
        }
        Ok(plan)
    }

    pub fn save_menu_plan(&self, plan: &MenuPlan) -> Result<()> {
        self.store.save_json(keys::DAILY_MENUS, plan)
    }

    pub fn tasks(&self) -> Result<Vec<Task>> {
        self.load_or_default(keys::TASKS)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        self.store.save_json(keys::TASKS, &tasks)
    }

    /// Append tasks to the saved list.
    pub fn add_tasks(&self, new_tasks: Vec<Task>) -> Result<()> {
        if new_tasks.is_empty() {
            return Ok(());
        }
        let mut tasks = self.tasks()?;
        tasks.extend(new_tasks);
        self.save_tasks(&tasks)
    }

    /// Mark a task completed. Returns the updated task, or `None` if no task
    /// has that id. Completing an already completed task changes nothing.
    pub fn complete_task(&self, id: &str) -> Result<Option<Task>> {
        let mut tasks = self.tasks()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if task.status == TaskStatus::Completed {
            return Ok(Some(task.clone()));
        }
        task.status = TaskStatus::Completed;
        let done = task.clone();
        self.save_tasks(&tasks)?;
        debug!(task = %done.id, "task completed");
        Ok(Some(done))
    }

    pub fn reminders(&self) -> Result<Vec<Reminder>> {
        self.load_or_default(keys::REMINDERS)
    }

    pub fn save_reminders(&self, reminders: &[Reminder]) -> Result<()> {
        self.store.save_json(keys::REMINDERS, &reminders)
    }

    /// Delete a reminder. Returns false if no reminder has that id.
    pub fn remove_reminder(&self, id: &str) -> Result<bool> {
        let mut reminders = self.reminders()?;
        let before = reminders.len();
        reminders.retain(|r| r.id != id);
        if reminders.len() == before {
            return Ok(false);
        }
        self.save_reminders(&reminders)?;
        Ok(true)
    }

    pub fn monitor_state(&self) -> Result<MonitorState> {
        self.load_or_default(keys::MONITOR_STATE)
    }

    pub fn save_monitor_state(&self, state: &MonitorState) -> Result<()> {
        self.store.save_json(keys::MONITOR_STATE, state)
    }

    /// The stored first-connection record, whatever its date.
    pub fn first_connection(&self) -> Result<Option<FirstConnectionRecord>> {
        self.store.load_json(keys::FIRST_CONNECTION)
    }

    /// Store `record`, or delete the stored one when `None`.
    pub fn save_first_connection(&self, record: Option<&FirstConnectionRecord>) -> Result<()> {
        match record {
            Some(record) => self.store.save_json(keys::FIRST_CONNECTION, record),
            None => self.store.remove(keys::FIRST_CONNECTION),
        }
    }

    pub fn restock_monitor(&self) -> Result<RestockMonitor> {
        self.load_or_default(keys::RESTOCK_MONITOR)
    }

    pub fn save_restock_monitor(&self, monitor: &RestockMonitor) -> Result<()> {
        self.store.save_json(keys::RESTOCK_MONITOR, monitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::pantry::{StockCategory, StockItem};
    use crate::storage::MemoryStore;
    use crate::tasks::{ReminderCategory, ReminderFrequency, TaskKind, TaskPriority};
    use chrono::{TimeZone, Utc};

    fn store() -> HouseholdStore<MemoryStore> {
        HouseholdStore::new(MemoryStore::new())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn empty_store_yields_defaults() {
        let s = store();
        assert!(s.stock().unwrap().is_empty());
        assert!(s.tasks().unwrap().is_empty());
        assert_eq!(s.monitor_state().unwrap(), MonitorState::default());
        assert_eq!(s.first_connection().unwrap(), None);
        assert!(s.restock_monitor().unwrap().previously_available());
    }

    #[test]
    fn menu_plan_is_seeded_and_persisted() {
        let s = store();
        let plan = s.menu_plan(day(10)).unwrap();
        assert_eq!(plan.menu_for(day(10)).breakfast, "Wheat Dosa");
        assert!(s.inner().load_raw(keys::DAILY_MENUS).unwrap().is_some());

        let next = s.menu_plan(day(11)).unwrap();
        assert_eq!(next.menu_for(day(11)).breakfast, "Poha");
        assert_eq!(next.menu_for(day(12)).breakfast, "No meal planned");
    }

    #[test]
    fn stock_with_collision_is_rejected() {
        let s = store();
        let mut stock = Stock::default();
        stock.upsert(StockCategory::Groceries, "onion", StockItem::new("kg", 1.0));
        stock
            .vegetables
            .insert("onion".into(), StockItem::new("kg", 2.0));
        assert!(matches!(
            s.save_stock(&stock),
            Err(CoreError::Validation(ValidationError::PartitionCollision(_)))
        ));
        assert!(s.stock().unwrap().is_empty());
    }

    #[test]
    fn imported_negative_quantity_is_rejected() {
        let s = store();
        let stock: Stock = serde_json::from_str(
            r#"{"groceries":{"rice":{"unit":"kg","quantity":-3.0,"threshold":1.0}}}"#,
        )
        .unwrap();
        assert!(matches!(
            s.save_stock(&stock),
            Err(CoreError::Validation(ValidationError::InvalidQuantity { ref name, value }))
                if name == "rice" && value == -3.0
        ));
        assert!(s.stock().unwrap().is_empty());
    }

    #[test]
    fn first_connection_save_and_remove() {
        let s = store();
        let record = FirstConnectionRecord {
            date: day(10),
            timestamp: 1_718_000_000_000,
        };
        s.save_first_connection(Some(&record)).unwrap();
        assert_eq!(s.first_connection().unwrap(), Some(record));
        s.save_first_connection(None).unwrap();
        assert_eq!(s.first_connection().unwrap(), None);
    }

    #[test]
    fn complete_task_marks_only_that_task() {
        let s = store();
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        let a = Task::new(TaskKind::Todo, "Call plumber", day(10), "10:00", TaskPriority::Medium, now);
        let b = Task::urgent_purchase("rice", now);
        s.save_tasks(&[a.clone(), b.clone()]).unwrap();

        let done = s.complete_task(&a.id).unwrap().unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        let tasks = s.tasks().unwrap();
        assert!(!tasks[0].is_pending());
        assert!(tasks[1].is_pending());

        assert_eq!(s.complete_task(&a.id).unwrap(), Some(done));
        assert_eq!(s.complete_task("task-missing").unwrap(), None);
    }

    #[test]
    fn reminders_save_and_remove() {
        let s = store();
        assert!(s.reminders().unwrap().is_empty());
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        let r = Reminder::new(
            "Take vitamins",
            ReminderCategory::Health,
            ReminderFrequency::Daily,
            "08:30",
            day(10),
            now,
        );
        s.save_reminders(&[r.clone()]).unwrap();
        assert_eq!(s.reminders().unwrap(), vec![r.clone()]);

        assert!(!s.remove_reminder("reminder-missing").unwrap());
        assert!(s.remove_reminder(&r.id).unwrap());
        assert!(s.reminders().unwrap().is_empty());
    }
}
