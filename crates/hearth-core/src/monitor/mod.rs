//! First-connection-of-the-day monitor with two one-shot timers.

mod engine;
pub mod probe;
pub mod scheduler;
mod state;

pub use engine::DailyMonitor;
pub use probe::{CommandProbe, ConnectionProbe, ConnectionSignal, MockProbe};
pub use scheduler::{FireId, ScheduledFire, TimerScheduler};
pub use state::{
    ConnectionEvent, DurationUnit, FirstConnectionRecord, MonitorConfig, MonitorState,
    TimerDuration, TimerPhase, TimerSlot, TimerState, Timers,
};

pub(crate) use engine::to_datetime;
