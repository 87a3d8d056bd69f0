//! # Hearth Core Library
//!
//! This library provides the core logic for Hearth, a household assistant
//! that tracks the pantry, plans meals and runs a daily dual-timer monitor
//! keyed on the first network connection of the day. Every operation is
//! available through the `hearth` CLI binary.
//!
//! ## Architecture
//!
//! - **Pantry**: ingredient amount normalization, dish availability,
//!   depletion, meal rotation, stock status, menu plan, nutrition, restock
//!   alerting
//! - **Monitor**: a wall-clock state machine that requires the caller to
//!   periodically invoke `tick()`; timer fires live in an explicit scheduler
//! - **Storage**: SQLite key/value persistence and TOML configuration
//! - **Announce / Notify**: voice and Telegram text, daily announcement
//!   scheduling and the sinks that deliver them
//!
//! ## Key Components
//!
//! - [`DailyMonitor`]: First-connection timer state machine
//! - [`MenuPlan`]: Daily menus with rotate and cook actions
//! - [`Database`]: Key/value and connection history persistence
//! - [`Config`]: Application configuration management
//! - [`Dispatcher`]: Event to notification fan-out

pub mod announce;
pub mod error;
pub mod events;
pub mod monitor;
pub mod notify;
pub mod pantry;
pub mod storage;
pub mod tasks;

pub use error::{ConfigError, CoreError, DatabaseError, NotifyError, ValidationError};
pub use events::Event;
pub use monitor::{DailyMonitor, MonitorConfig, MonitorState, TimerSlot, TimerState};
pub use notify::{Dispatcher, Notification, Notifier, Speaker, TelegramSender};
pub use pantry::{Dish, FoodMenu, MealType, MenuPlan, Stock, StockCategory, StockItem};
pub use storage::{Config, Database, HouseholdStore, KeyValueStore};
pub use tasks::{Reminder, Task};
