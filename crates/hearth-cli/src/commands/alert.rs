use chrono::{DateTime, Utc};
use clap::Subcommand;
use hearth_core::pantry::{has_available_meals, RestockAlert};
use hearth_core::Event;
use serde_json::json;
use tracing::debug;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum AlertAction {
    /// Check whether any meal can still be cooked; alert on the drop to none
    Check {
        /// Re-baseline without alerting
        #[arg(long)]
        reset: bool,
    },
}

/// Run the edge-triggered restock check after a stock change.
///
/// On the alert edge the shopping tasks are saved and the alert is sent to
/// the configured sinks. A household without recipes is never alerted.
pub async fn check_restock(
    ctx: &Context,
    now: DateTime<Utc>,
) -> Result<Option<RestockAlert>, Box<dyn std::error::Error>> {
    let food = ctx.store.food_menu()?;
    if food.iter().all(|(_, dishes)| dishes.is_empty()) {
        debug!("no recipes saved, skipping restock check");
        return Ok(None);
    }
    let stock = ctx.store.stock()?;
    let mut monitor = ctx.store.restock_monitor()?;
    let alert = monitor.check(&food, &stock, now);
    ctx.store.save_restock_monitor(&monitor)?;

    if let Some(alert) = &alert {
        ctx.store.add_tasks(alert.shopping_tasks.clone())?;
        ctx.dispatcher
            .dispatch(&Event::RestockNeeded {
                missing_items: alert.missing_items.clone(),
                at: now,
            })
            .await;
    }
    Ok(alert)
}

pub async fn run(action: AlertAction) -> CliResult {
    let ctx = Context::load()?;
    match action {
        AlertAction::Check { reset: true } => {
            let available =
                has_available_meals(&ctx.store.food_menu()?, &ctx.store.stock()?);
            let mut monitor = ctx.store.restock_monitor()?;
            monitor.reset(available);
            ctx.store.save_restock_monitor(&monitor)?;
            print_json(&json!({ "meals_available": available, "alert": null }))?;
        }
        AlertAction::Check { reset: false } => {
            let alert = check_restock(&ctx, Utc::now()).await?;
            let available =
                has_available_meals(&ctx.store.food_menu()?, &ctx.store.stock()?);
            print_json(&json!({ "meals_available": available, "alert": alert }))?;
        }
    }
    Ok(())
}
