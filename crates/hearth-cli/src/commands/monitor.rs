use std::error::Error;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use hearth_core::announce::schedule::parse_hhmm;
use hearth_core::announce::AnnouncementPlanner;
use hearth_core::monitor::{
    CommandProbe, ConnectionEvent, ConnectionProbe, MockProbe, TimerSlot,
};
use hearth_core::{DailyMonitor, Event};
use serde_json::json;
use tracing::{debug, info, warn};

use super::{announce, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum MonitorAction {
    /// Show connection state and both timers
    Status,
    /// Report a connection (defaults to the target network)
    Connect {
        /// Network name
        ssid: Option<String>,
    },
    /// Report that the network went away
    Disconnect,
    /// Override today's first connection and re-arm both timers
    SetFirst {
        /// "HH:MM" (local time today) or an RFC 3339 timestamp
        time: String,
    },
    /// Forget today's first connection and reset the timers
    Clear,
    /// Fire any timer whose trigger time has passed
    Tick,
    /// Show recorded first connections
    History {
        /// Days to look back
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Delete rows older than this many days first
        #[arg(long)]
        cleanup: Option<u32>,
    },
    /// Poll the network, fire timers and run announcements until Ctrl-C
    Watch {
        /// Simulate the network instead of running the probe command
        #[arg(long)]
        mock: bool,
    },
}

type MonitorResult<T> = Result<T, Box<dyn Error>>;

fn load_monitor(ctx: &Context, now: DateTime<Utc>) -> MonitorResult<(DailyMonitor, Vec<Event>)> {
    Ok(DailyMonitor::restore(
        ctx.config.monitor.monitor_config(),
        ctx.store.monitor_state()?,
        ctx.store.first_connection()?,
        now,
    ))
}

fn save_monitor(ctx: &Context, monitor: &DailyMonitor) -> MonitorResult<()> {
    ctx.store.save_monitor_state(monitor.state())?;
    ctx.store
        .save_first_connection(monitor.first_connection_record().as_ref())?;
    Ok(())
}

fn record_history(ctx: &Context, events: &[Event]) -> MonitorResult<()> {
    for event in events {
        if let Event::FirstConnection { ssid, at } = event {
            ctx.store.inner().record_connection(&ConnectionEvent {
                timestamp: at.timestamp_millis(),
                ssid: ssid.clone(),
                is_first_of_day: true,
            })?;
        }
    }
    Ok(())
}

/// Persist, record and deliver the events of a one-shot command.
async fn settle(ctx: &Context, monitor: &DailyMonitor, events: &[Event]) -> MonitorResult<()> {
    save_monitor(ctx, monitor)?;
    record_history(ctx, events)?;
    for event in events {
        ctx.dispatcher.dispatch(event).await;
    }
    Ok(())
}

fn status_json(monitor: &DailyMonitor) -> serde_json::Value {
    let timer = |slot: TimerSlot| {
        let state = monitor.timer(slot);
        json!({
            "phase": monitor.phase(slot),
            "trigger_at": state.trigger_time.and_then(DateTime::from_timestamp_millis),
            "duration": monitor.config().duration(slot).to_string(),
        })
    };
    let state = monitor.state();
    json!({
        "target_ssid": monitor.config().target_ssid,
        "is_connected": state.is_connected,
        "current_ssid": state.current_ssid,
        "first_connection": monitor.first_connection(),
        "timer1": timer(TimerSlot::Timer1),
        "timer2": timer(TimerSlot::Timer2),
        "next_fire_at": monitor.next_fire_at(),
    })
}

/// Accept "HH:MM" as local time today, or a full RFC 3339 timestamp.
fn parse_first_connection(text: &str) -> MonitorResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }
    let time = parse_hhmm(text)?;
    let local = Local::now()
        .date_naive()
        .and_time(time)
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| format!("{text} does not exist in the local time zone today"))?;
    Ok(local.with_timezone(&Utc))
}

pub async fn run(action: MonitorAction) -> CliResult {
    let ctx = Context::load()?;
    let now = Utc::now();
    match action {
        MonitorAction::Status => {
            let (mut monitor, mut events) = load_monitor(&ctx, now)?;
            events.extend(monitor.tick(now));
            settle(&ctx, &monitor, &events).await?;
            let mut status = status_json(&monitor);
            let planner = AnnouncementPlanner::from_config(&ctx.config, &Local::now());
            status["announcements"] = json!(planner.planned());
            status["events"] = json!(events);
            print_json(&status)?;
        }
        MonitorAction::Connect { ssid } => {
            let (mut monitor, mut events) = load_monitor(&ctx, now)?;
            let ssid = ssid.unwrap_or_else(|| monitor.config().target_ssid.clone());
            events.extend(monitor.handle_connection(&ssid, now));
            events.extend(monitor.tick(now));
            settle(&ctx, &monitor, &events).await?;
            print_json(&events)?;
        }
        MonitorAction::Disconnect => {
            let (mut monitor, mut events) = load_monitor(&ctx, now)?;
            events.extend(monitor.handle_disconnection(now));
            settle(&ctx, &monitor, &events).await?;
            print_json(&events)?;
        }
        MonitorAction::SetFirst { time } => {
            let first = parse_first_connection(&time)?;
            let (mut monitor, mut events) = load_monitor(&ctx, now)?;
            events.extend(monitor.set_first_connection_time(first, now));
            settle(&ctx, &monitor, &events).await?;
            print_json(&events)?;
        }
        MonitorAction::Clear => {
            let (mut monitor, mut events) = load_monitor(&ctx, now)?;
            events.extend(monitor.clear_daily_data(now));
            settle(&ctx, &monitor, &events).await?;
            print_json(&events)?;
        }
        MonitorAction::Tick => {
            let (mut monitor, mut events) = load_monitor(&ctx, now)?;
            events.extend(monitor.tick(now));
            settle(&ctx, &monitor, &events).await?;
            print_json(&events)?;
        }
        MonitorAction::History { days, cleanup } => {
            let db = ctx.store.inner();
            let removed = match cleanup {
                Some(keep) => Some(db.cleanup_connections(keep, now)?),
                None => None,
            };
            let history = db.connection_history(days, now)?;
            print_json(&json!({ "removed": removed, "connections": history }))?;
        }
        MonitorAction::Watch { mock } => watch(&ctx, mock).await?,
    }
    Ok(())
}

fn emit(event: &Event) -> MonitorResult<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

async fn watch(ctx: &Context, mock: bool) -> CliResult {
    let section = &ctx.config.monitor;
    let mut probe: Box<dyn ConnectionProbe + Send> = if mock || section.mock_mode {
        Box::new(MockProbe::new(section.target_ssid.clone()))
    } else {
        let probe = CommandProbe::from_command_line(&section.probe_command)
            .ok_or("monitor.probe_command is empty; set it or use --mock")?;
        Box::new(probe)
    };

    let (mut monitor, events) = load_monitor(ctx, Utc::now())?;
    publish(ctx, &monitor, &events)?;
    let mut planner = AnnouncementPlanner::from_config(&ctx.config, &Local::now());
    for job in planner.planned() {
        debug!(job = %job.id, next_run = %job.next_run, "announcement scheduled");
    }

    let mut interval = tokio::time::interval(Duration::from_secs(section.poll_interval_secs.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    info!(
        target_ssid = %section.target_ssid,
        mock = mock || section.mock_mode,
        "watching"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("stopping");
                break;
            }
            _ = interval.tick() => {}
        }

        let now = Utc::now();
        let signal = tokio::task::block_in_place(|| probe.sample());
        let mut events = monitor.roll_day(now);
        events.extend(monitor.observe(&signal, now));
        events.extend(monitor.tick(now));
        publish(ctx, &monitor, &events)?;

        for due in planner.take_due(&Local::now()) {
            emit(&due.event())?;
            if let Err(e) = announce::deliver(ctx, due.channel, &due.schedule, false).await {
                warn!(schedule = %due.schedule.id, error = %e, "announcement failed");
            }
        }

        let local = Local::now();
        arm_reminders(ctx, &mut planner, &local)?;
        for due in planner.take_due_reminders(&local) {
            emit(&due.event())?;
            if let Err(e) = announce::remind(ctx, &due).await {
                warn!(item = %due.item.id(), error = %e, "reminder failed");
            }
        }
    }
    save_monitor(ctx, &monitor)?;
    Ok(())
}

/// Load today's tasks and reminders into the planner. Reminders whose date
/// passed without firing move on to their next occurrence first.
fn arm_reminders(
    ctx: &Context,
    planner: &mut AnnouncementPlanner,
    now: &DateTime<Local>,
) -> MonitorResult<()> {
    let tasks = ctx.store.tasks()?;
    let mut reminders = ctx.store.reminders()?;
    let today = now.date_naive();
    let mut moved = false;
    for r in reminders.iter_mut() {
        moved |= r.catch_up(today);
    }
    if moved {
        ctx.store.save_reminders(&reminders)?;
    }
    planner.arm_reminders(&tasks, &reminders, now);
    Ok(())
}

/// Print, persist and hand off the events of one watch step. Delivery runs
/// on its own task so a slow sink never delays the next poll.
fn publish(ctx: &Context, monitor: &DailyMonitor, events: &[Event]) -> MonitorResult<()> {
    if events.is_empty() {
        return Ok(());
    }
    save_monitor(ctx, monitor)?;
    record_history(ctx, events)?;
    for event in events {
        emit(event)?;
        let dispatcher = ctx.dispatcher.clone();
        let event = event.clone();
        tokio::spawn(async move {
            dispatcher.dispatch(&event).await;
        });
    }
    Ok(())
}
