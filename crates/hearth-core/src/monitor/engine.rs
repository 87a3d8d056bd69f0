//! Daily dual-timer monitor.
//!
//! A wall-clock state machine with no internal thread. The caller feeds it
//! connectivity observations and calls `tick()` periodically; every change
//! comes back as a list of [`Event`]s.
//!
//! ## Timer lifecycle
//!
//! ```text
//! Idle -> Armed -> Fired
//!   ^       |
//!   +-------+  (override / clear)
//! ```
//!
//! A timer fires at most once per stored day. Arming computes
//! `first_connection + duration`; a trigger that is already in the past is
//! skipped and the timer stays idle.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::probe::ConnectionSignal;
use super::scheduler::TimerScheduler;
use super::state::{
    FirstConnectionRecord, MonitorConfig, MonitorState, TimerPhase, TimerSlot, TimerState, Timers,
};
use crate::events::Event;

pub(crate) fn to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}

#[derive(Debug, Clone)]
pub struct DailyMonitor {
    config: MonitorConfig,
    state: MonitorState,
    first_record: Option<FirstConnectionRecord>,
    scheduler: TimerScheduler<TimerSlot>,
}

impl DailyMonitor {
    /// Fresh monitor with nothing recorded.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            state: MonitorState::default(),
            first_record: None,
            scheduler: TimerScheduler::new(),
        }
    }

    /// Rebuild a monitor from persisted state.
    ///
    /// The first-connection record only counts when its date equals today's
    /// UTC date. Otherwise the day starts over: timers go back to idle and
    /// the connection flags are cleared so the next observation counts as a
    /// new first connection. Armed timers take their trigger from the record
    /// and the configured durations, and fire on the next `tick()` even if
    /// that time has already passed. Idle timers whose trigger has passed
    /// stay idle without another skip event.
    pub fn restore(
        config: MonitorConfig,
        mut state: MonitorState,
        record: Option<FirstConnectionRecord>,
        now: DateTime<Utc>,
    ) -> (Self, Vec<Event>) {
        let today = now.date_naive();
        let mut events = Vec::new();

        let record = match record {
            Some(r) if r.date == today => Some(r),
            Some(r) => {
                info!(date = %r.date, "discarding first connection from an earlier day");
                events.push(Event::StaleDayDiscarded { date: r.date });
                None
            }
            None => None,
        };

        let mut monitor = match record {
            Some(r) => {
                state.first_connection_today = Some(r.timestamp);
                Self {
                    config,
                    state,
                    first_record: Some(r),
                    scheduler: TimerScheduler::new(),
                }
            }
            None => {
                state.first_connection_today = None;
                state.timers = Timers::default();
                state.is_connected = false;
                state.current_ssid = None;
                state.last_connection_time = None;
                let monitor = Self {
                    config,
                    state,
                    first_record: None,
                    scheduler: TimerScheduler::new(),
                };
                return (monitor, events);
            }
        };

        let first = record.map(|r| r.timestamp).unwrap_or_default();
        for slot in TimerSlot::ALL {
            let timer = *monitor.state.timers.get(slot);
            let trigger = first.saturating_add(monitor.config.duration(slot).millis());
            match timer.phase() {
                TimerPhase::Fired => {}
                TimerPhase::Armed => {
                    if timer.trigger_time != Some(trigger) {
                        debug!(timer = %slot, trigger = %to_datetime(trigger), "duration changed, moving trigger");
                    }
                    monitor.state.timers.get_mut(slot).trigger_time = Some(trigger);
                    monitor.scheduler.schedule(slot, trigger);
                }
                // Already reported as skipped when it was first armed.
                TimerPhase::Idle if trigger <= now.timestamp_millis() => {
                    debug!(timer = %slot, "trigger already passed, staying idle");
                }
                TimerPhase::Idle => events.extend(monitor.arm_slot(slot, first, now)),
            }
        }
        (monitor, events)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn timer(&self, slot: TimerSlot) -> &TimerState {
        self.state.timers.get(slot)
    }

    pub fn phase(&self, slot: TimerSlot) -> TimerPhase {
        self.timer(slot).phase()
    }

    pub fn first_connection(&self) -> Option<DateTime<Utc>> {
        self.state.first_connection_today.map(to_datetime)
    }

    /// The record to persist alongside the state, if any.
    pub fn first_connection_record(&self) -> Option<FirstConnectionRecord> {
        self.first_record
    }

    /// Earliest pending trigger.
    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.scheduler.next_fire_at().map(to_datetime)
    }

    pub fn pending_fires(&self) -> usize {
        self.scheduler.len()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Feed one connectivity sample. Only edges change state.
    pub fn observe(&mut self, signal: &ConnectionSignal, now: DateTime<Utc>) -> Vec<Event> {
        match (signal.connected, self.state.is_connected) {
            (true, false) => match signal.ssid.as_deref() {
                Some(ssid) => self.handle_connection(ssid, now),
                None => Vec::new(),
            },
            (false, true) => self.handle_disconnection(now),
            _ => Vec::new(),
        }
    }

    /// A connection to `ssid` was observed at `now`.
    ///
    /// Networks other than the target are ignored entirely.
    pub fn handle_connection(&mut self, ssid: &str, now: DateTime<Utc>) -> Vec<Event> {
        if ssid != self.config.target_ssid {
            debug!(ssid, target = %self.config.target_ssid, "ignoring non-target network");
            return Vec::new();
        }

        let now_ms = now.timestamp_millis();
        self.state.is_connected = true;
        self.state.current_ssid = Some(ssid.to_string());
        self.state.last_connection_time = Some(now_ms);

        if self.state.first_connection_today.is_some() {
            debug!(ssid, "reconnected to target network");
            return vec![Event::Reconnected {
                ssid: ssid.to_string(),
                at: now,
            }];
        }

        info!(ssid, at = %now, "first connection of the day");
        self.state.first_connection_today = Some(now_ms);
        self.first_record = Some(FirstConnectionRecord {
            date: now.date_naive(),
            timestamp: now_ms,
        });
        let mut events = vec![Event::FirstConnection {
            ssid: ssid.to_string(),
            at: now,
        }];
        events.extend(self.arm(now_ms, now));
        events
    }

    pub fn handle_disconnection(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        debug!("disconnected");
        self.state.is_connected = false;
        self.state.current_ssid = None;
        self.state.last_connection_time = None;
        vec![Event::Disconnected { at: now }]
    }

    /// Fire every armed timer whose trigger time has been reached.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        for fire in self.scheduler.take_due(now.timestamp_millis()) {
            let timer = self.state.timers.get_mut(fire.key);
            if timer.triggered || !timer.active {
                continue;
            }
            timer.triggered = true;
            timer.active = false;
            info!(timer = %fire.key, "timer fired");
            events.push(Event::TimerFired {
                timer: fire.key,
                trigger_at: to_datetime(fire.fire_at),
                at: now,
            });
        }
        events
    }

    /// Replace today's first connection and re-arm both timers from it.
    ///
    /// Pending fires are cancelled and both timers restart from idle, so a
    /// timer that already fired today can fire again.
    pub fn set_first_connection_time(
        &mut self,
        first: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        let cancelled = self.scheduler.cancel_all();
        debug!(cancelled, "cancelled pending timers for override");
        let first_ms = first.timestamp_millis();
        self.state.first_connection_today = Some(first_ms);
        self.state.timers = Timers::default();
        self.first_record = Some(FirstConnectionRecord {
            date: now.date_naive(),
            timestamp: first_ms,
        });

        let mut events = vec![Event::FirstConnectionOverridden {
            first_connection: first,
        }];
        events.extend(self.arm(first_ms, now));
        events
    }

    /// Forget today's first connection and reset both timers without re-arming.
    pub fn clear_daily_data(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.scheduler.cancel_all();
        self.state.first_connection_today = None;
        self.state.timers = Timers::default();
        self.first_record = None;
        info!("daily data cleared");
        vec![Event::DailyDataCleared { at: now }]
    }

    /// Start a new day if the stored first connection belongs to an
    /// earlier UTC date and no timer is still pending.
    ///
    /// Same reset as a stale restore: timers go idle and the connection
    /// flags are cleared, so a network that stayed up across midnight is
    /// seen as today's first connection on the next observation. A timer
    /// armed past midnight fires first; the reset waits for it.
    pub fn roll_day(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let Some(record) = self.first_record else {
            return Vec::new();
        };
        if record.date >= now.date_naive() || !self.scheduler.is_empty() {
            return Vec::new();
        }
        info!(date = %record.date, "new day, resetting monitor");
        self.first_record = None;
        self.state.first_connection_today = None;
        self.state.timers = Timers::default();
        self.state.is_connected = false;
        self.state.current_ssid = None;
        self.state.last_connection_time = None;
        vec![Event::StaleDayDiscarded { date: record.date }]
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, first_ms: i64, now: DateTime<Utc>) -> Vec<Event> {
        TimerSlot::ALL
            .into_iter()
            .flat_map(|slot| self.arm_slot(slot, first_ms, now))
            .collect()
    }

    fn arm_slot(&mut self, slot: TimerSlot, first_ms: i64, now: DateTime<Utc>) -> Option<Event> {
        let trigger = first_ms.saturating_add(self.config.duration(slot).millis());
        let timer = self.state.timers.get_mut(slot);
        if timer.triggered {
            return None;
        }
        if trigger <= now.timestamp_millis() {
            warn!(timer = %slot, trigger = %to_datetime(trigger), "trigger time already passed, not arming");
            return Some(Event::TimerSkipped {
                timer: slot,
                trigger_at: to_datetime(trigger),
            });
        }
        timer.active = true;
        timer.trigger_time = Some(trigger);
        self.scheduler.schedule(slot, trigger);
        debug!(timer = %slot, trigger = %to_datetime(trigger), "timer armed");
        Some(Event::TimerArmed {
            timer: slot,
            trigger_at: to_datetime(trigger),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::TimerDuration;
    use chrono::{Duration, TimeZone};

    fn config() -> MonitorConfig {
        MonitorConfig {
            target_ssid: "HomeNet".into(),
            ..MonitorConfig::default()
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, 0).unwrap()
    }

    fn fired(events: &[Event]) -> Vec<TimerSlot> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::TimerFired { timer, .. } => Some(*timer),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_connection_arms_both_timers() {
        let mut m = DailyMonitor::new(config());
        let events = m.handle_connection("HomeNet", at(9, 0));
        assert!(matches!(events[0], Event::FirstConnection { .. }));
        assert_eq!(m.phase(TimerSlot::Timer1), TimerPhase::Armed);
        assert_eq!(
            m.timer(TimerSlot::Timer1).trigger_time,
            Some(at(16, 0).timestamp_millis())
        );
        assert_eq!(
            m.timer(TimerSlot::Timer2).trigger_time,
            Some(at(17, 0).timestamp_millis())
        );
        assert_eq!(m.next_fire_at(), Some(at(16, 0)));
        assert_eq!(m.first_connection_record().map(|r| r.date), Some(at(9, 0).date_naive()));
    }

    #[test]
    fn other_networks_are_ignored() {
        let mut m = DailyMonitor::new(config());
        assert!(m.handle_connection("CoffeeShop", at(9, 0)).is_empty());
        assert!(!m.state().is_connected);
        assert_eq!(m.first_connection(), None);
    }

    #[test]
    fn reconnect_keeps_first_connection() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        m.handle_disconnection(at(10, 0));
        assert!(!m.state().is_connected);
        assert_eq!(m.state().last_connection_time, None);
        let events = m.handle_connection("HomeNet", at(11, 0));
        assert!(matches!(events[0], Event::Reconnected { .. }));
        assert_eq!(m.first_connection(), Some(at(9, 0)));
        assert_eq!(m.timer(TimerSlot::Timer1).trigger_time, Some(at(16, 0).timestamp_millis()));
    }

    #[test]
    fn timers_fire_once() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        assert!(fired(&m.tick(at(15, 59))).is_empty());
        assert_eq!(fired(&m.tick(at(16, 0))), vec![TimerSlot::Timer1]);
        assert!(fired(&m.tick(at(16, 30))).is_empty());
        assert_eq!(fired(&m.tick(at(18, 0))), vec![TimerSlot::Timer2]);
        assert!(m.tick(at(23, 0)).is_empty());
        assert_eq!(m.phase(TimerSlot::Timer1), TimerPhase::Fired);
        assert_eq!(m.phase(TimerSlot::Timer2), TimerPhase::Fired);
        assert_eq!(m.pending_fires(), 0);
    }

    #[test]
    fn override_cancels_pending_fires() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        m.set_first_connection_time(at(10, 0), at(10, 30));
        assert!(fired(&m.tick(at(16, 0))).is_empty());
        assert_eq!(fired(&m.tick(at(17, 0))), vec![TimerSlot::Timer1]);
        assert_eq!(fired(&m.tick(at(18, 0))), vec![TimerSlot::Timer2]);
    }

    #[test]
    fn override_skips_past_triggers() {
        let mut m = DailyMonitor::new(config());
        let events = m.set_first_connection_time(at(2, 0), at(9, 30));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::TimerSkipped { timer: TimerSlot::Timer1, .. }
        )));
        assert_eq!(m.phase(TimerSlot::Timer1), TimerPhase::Idle);
        assert_eq!(m.phase(TimerSlot::Timer2), TimerPhase::Armed);
        assert_eq!(fired(&m.tick(at(23, 0))), vec![TimerSlot::Timer2]);
    }

    #[test]
    fn override_rearms_fired_timer() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        m.tick(at(16, 0));
        m.set_first_connection_time(at(12, 0), at(16, 5));
        assert_eq!(m.phase(TimerSlot::Timer1), TimerPhase::Armed);
        assert_eq!(fired(&m.tick(at(19, 0))), vec![TimerSlot::Timer1]);
    }

    #[test]
    fn clear_resets_without_rearming() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        m.clear_daily_data(at(10, 0));
        assert_eq!(m.first_connection(), None);
        assert_eq!(m.first_connection_record(), None);
        assert_eq!(m.phase(TimerSlot::Timer1), TimerPhase::Idle);
        assert!(m.tick(at(23, 0)).is_empty());
        // Still connected, so only a fresh edge re-arms.
        assert!(m.state().is_connected);
    }

    #[test]
    fn observe_reacts_to_edges_only() {
        let mut m = DailyMonitor::new(config());
        let up = ConnectionSignal::connected("HomeNet");
        assert_eq!(m.observe(&up, at(9, 0)).len(), 3);
        assert!(m.observe(&up, at(9, 5)).is_empty());
        let down = ConnectionSignal::disconnected();
        assert_eq!(m.observe(&down, at(9, 10)).len(), 1);
        assert!(m.observe(&down, at(9, 15)).is_empty());
    }

    #[test]
    fn restore_same_day_keeps_armed_timers() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        m.tick(at(16, 0));
        let saved = m.state().clone();
        let record = m.first_connection_record();

        let (mut back, events) = DailyMonitor::restore(config(), saved, record, at(16, 10));
        assert!(events.is_empty());
        assert_eq!(back.phase(TimerSlot::Timer1), TimerPhase::Fired);
        assert_eq!(back.phase(TimerSlot::Timer2), TimerPhase::Armed);
        assert_eq!(fired(&back.tick(at(17, 0))), vec![TimerSlot::Timer2]);
    }

    #[test]
    fn restore_fires_overdue_armed_timer() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        let (mut back, _) = DailyMonitor::restore(
            config(),
            m.state().clone(),
            m.first_connection_record(),
            at(16, 30),
        );
        assert_eq!(fired(&back.tick(at(16, 30))), vec![TimerSlot::Timer1]);
    }

    #[test]
    fn restore_does_not_repeat_skips() {
        let mut m = DailyMonitor::new(config());
        let events = m.set_first_connection_time(at(1, 0), at(8, 30));
        let skipped = events
            .iter()
            .filter(|e| matches!(e, Event::TimerSkipped { .. }))
            .count();
        assert_eq!(skipped, 1);
        assert_eq!(m.phase(TimerSlot::Timer1), TimerPhase::Idle);
        assert_eq!(m.phase(TimerSlot::Timer2), TimerPhase::Armed);

        for minute in [35, 40] {
            let (back, events) = DailyMonitor::restore(
                config(),
                m.state().clone(),
                m.first_connection_record(),
                at(8, minute),
            );
            assert!(events.is_empty(), "{events:?}");
            assert_eq!(back.phase(TimerSlot::Timer1), TimerPhase::Idle);
            assert_eq!(back.pending_fires(), 1);
        }
    }

    #[test]
    fn restore_applies_changed_durations_to_armed_timers() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        let mut shorter = config();
        shorter.timer1 = TimerDuration::hours(2);

        let (mut back, events) = DailyMonitor::restore(
            shorter,
            m.state().clone(),
            m.first_connection_record(),
            at(10, 0),
        );
        assert!(events.is_empty());
        assert_eq!(
            back.timer(TimerSlot::Timer1).trigger_time,
            Some(at(11, 0).timestamp_millis())
        );
        assert_eq!(back.next_fire_at(), Some(at(11, 0)));
        assert_eq!(fired(&back.tick(at(11, 0))), vec![TimerSlot::Timer1]);
    }

    #[test]
    fn restore_discards_stale_day() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        m.tick(at(18, 0));
        let next_day = at(8, 0) + Duration::days(1);
        let (mut back, events) = DailyMonitor::restore(
            config(),
            m.state().clone(),
            m.first_connection_record(),
            next_day,
        );
        assert!(matches!(events[0], Event::StaleDayDiscarded { .. }));
        assert_eq!(back.first_connection(), None);
        assert_eq!(back.phase(TimerSlot::Timer1), TimerPhase::Idle);
        assert!(!back.state().is_connected);

        let events = back.observe(&ConnectionSignal::connected("HomeNet"), next_day);
        assert!(matches!(events[0], Event::FirstConnection { .. }));
        assert_eq!(back.phase(TimerSlot::Timer2), TimerPhase::Armed);
    }

    #[test]
    fn roll_day_starts_over_after_midnight() {
        let mut m = DailyMonitor::new(config());
        m.handle_connection("HomeNet", at(9, 0));
        assert!(m.roll_day(at(23, 59)).is_empty());

        let tomorrow = at(9, 0) + Duration::days(1);
        let after_midnight = tomorrow - Duration::hours(8);
        // Both timers are still pending until a tick fires them.
        assert!(m.roll_day(after_midnight).is_empty());
        assert_eq!(fired(&m.tick(after_midnight)).len(), 2);

        let events = m.roll_day(after_midnight);
        assert!(matches!(events[..], [Event::StaleDayDiscarded { .. }]));
        assert_eq!(m.pending_fires(), 0);
        assert_eq!(m.first_connection(), None);
        assert!(!m.state().is_connected);

        let events = m.observe(&ConnectionSignal::connected("HomeNet"), tomorrow);
        assert!(matches!(events[0], Event::FirstConnection { .. }));
        assert_eq!(m.phase(TimerSlot::Timer1), TimerPhase::Armed);
    }
}
