use chrono::{Duration, Local};
use clap::Args;
use hearth_core::announce::{
    parse_content_types, telegram, telegram_message, voice_message, Briefing, Channel, DueItem,
    DueReminder,
};
use hearth_core::storage::AnnouncementSchedule;
use serde::Serialize;
use tracing::{info, warn};

use super::{print_json, today, CliResult, Context};

#[derive(Args)]
pub struct AnnounceArgs {
    /// Schedule id (e.g. "morning", "daily_update")
    pub schedule_id: String,
    /// Use the Telegram schedule with this id instead of the voice one
    #[arg(long)]
    pub telegram: bool,
    /// Also post the spoken text to Telegram, silently
    #[arg(long, conflicts_with = "telegram")]
    pub mirror: bool,
}

/// What an announcement produced and where it went.
#[derive(Debug, Serialize)]
pub struct Delivery {
    pub channel: Channel,
    pub schedule_id: String,
    pub text: Option<String>,
    pub delivered: bool,
}

/// Build the announcement for `schedule` from the current household state
/// and hand it to the channel's sink.
pub async fn deliver(
    ctx: &Context,
    channel: Channel,
    schedule: &AnnouncementSchedule,
    mirror: bool,
) -> Result<Delivery, Box<dyn std::error::Error>> {
    let today = today();
    let plan = ctx.store.menu_plan(today)?;
    let today_menu = plan.menu_for(today);
    let tomorrow_menu = plan.menu_for(today + Duration::days(1));
    let tasks = ctx.store.tasks()?;
    let reminders = ctx.store.reminders()?;
    let stock = ctx.store.stock()?;
    let food = ctx.store.food_menu()?;
    let briefing = Briefing {
        user_name: &ctx.config.household.user_info.user_name,
        now: Local::now().naive_local(),
        today_menu: &today_menu,
        tomorrow_menu: &tomorrow_menu,
        tasks: &tasks,
        reminders: &reminders,
        stock: &stock,
        food: &food,
    };
    let content = parse_content_types(&schedule.content_types);

    let (text, delivered) = match channel {
        Channel::Voice => {
            let text = voice_message(&briefing, &content);
            let spoken = ctx.dispatcher.speak(&text);
            if mirror {
                ctx.dispatcher
                    .send_telegram(&telegram::voice_announcement(&text), true)
                    .await;
            }
            (Some(text), spoken)
        }
        Channel::Telegram => match telegram_message(&briefing, &content) {
            Some(text) => {
                let sent = ctx.dispatcher.send_telegram(&text, false).await;
                (Some(text), sent)
            }
            None => {
                warn!(schedule = %schedule.id, "schedule selects no Telegram message");
                (None, false)
            }
        },
    };
    info!(%channel, schedule = %schedule.id, delivered, "announcement");
    Ok(Delivery {
        channel,
        schedule_id: schedule.id.clone(),
        text,
        delivered,
    })
}

/// Speak and send a task or reminder that reached its time. A recurring
/// reminder then moves on to its next occurrence.
pub async fn remind(ctx: &Context, due: &DueReminder) -> Result<(), Box<dyn std::error::Error>> {
    let spoken = ctx.dispatcher.speak(&due.item.voice_text());
    let sent = ctx
        .dispatcher
        .send_telegram(&due.item.telegram_text(), false)
        .await;
    info!(item = %due.item.id(), spoken, sent, "reminder");

    if let DueItem::Reminder(fired) = &due.item {
        let mut reminders = ctx.store.reminders()?;
        if let Some(r) = reminders.iter_mut().find(|r| r.id == fired.id) {
            r.advance();
            ctx.store.save_reminders(&reminders)?;
        }
    }
    Ok(())
}

pub async fn run(args: AnnounceArgs) -> CliResult {
    let ctx = Context::load()?;
    let (channel, schedules) = if args.telegram {
        (Channel::Telegram, &ctx.config.telegram.schedules)
    } else {
        (Channel::Voice, &ctx.config.voice.schedules)
    };
    let schedule = schedules
        .iter()
        .find(|s| s.id == args.schedule_id)
        .ok_or_else(|| format!("no {channel} schedule with id '{}'", args.schedule_id))?;

    let delivery = deliver(&ctx, channel, schedule, args.mirror).await?;
    print_json(&delivery)
}
