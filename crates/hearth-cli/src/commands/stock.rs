use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use hearth_core::pantry::{classify, low_stock_items, Stock, StockCategory, StockItem};
use serde_json::json;

use super::{alert, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum StockAction {
    /// List every stock item with its status
    List,
    /// List items that are low or out of stock
    Low,
    /// Set an item's quantity, creating it if needed
    Set {
        /// Ingredient name (e.g. "rice", "green_chili")
        name: String,
        /// New on-hand quantity
        quantity: f64,
        /// Stock unit (required for new items)
        #[arg(long)]
        unit: Option<String>,
        /// groceries or vegetables (defaults to the item's current partition)
        #[arg(long)]
        category: Option<StockCategory>,
        /// Low-stock threshold
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Replace the whole stock from a JSON file
    Import {
        /// File with `{ "groceries": {..}, "vegetables": {..} }`
        path: PathBuf,
    },
    /// Print the stock as JSON
    Export,
}

fn listing(stock: &Stock) -> Vec<serde_json::Value> {
    stock
        .iter()
        .map(|(category, name, item)| {
            json!({
                "name": name,
                "category": category,
                "quantity": item.quantity,
                "unit": item.unit,
                "threshold": item.threshold,
                "status": classify(item),
            })
        })
        .collect()
}

pub async fn run(action: StockAction) -> CliResult {
    let ctx = Context::load()?;
    match action {
        StockAction::List => print_json(&listing(&ctx.store.stock()?))?,
        StockAction::Low => print_json(&low_stock_items(&ctx.store.stock()?))?,
        StockAction::Set {
            name,
            quantity,
            unit,
            category,
            threshold,
        } => {
            if !quantity.is_finite() || quantity < 0.0 {
                return Err(format!("quantity must be a non-negative number, got {quantity}").into());
            }
            let mut stock = ctx.store.stock()?;
            let existing = stock.lookup(&name).map(|e| (e.category, e.item.clone()));
            let (category, item) = match existing {
                Some((current, mut item)) => {
                    item.quantity = quantity;
                    if let Some(unit) = unit {
                        item.unit = unit;
                    }
                    if threshold.is_some() {
                        item.threshold = threshold;
                    }
                    (category.unwrap_or(current), item)
                }
                None => {
                    let unit = unit.ok_or_else(|| format!("new item '{name}' needs --unit"))?;
                    let mut item = StockItem::new(unit, quantity);
                    item.threshold = threshold;
                    (category.unwrap_or(StockCategory::Groceries), item)
                }
            };
            stock.upsert(category, name.clone(), item.clone());
            ctx.store.save_stock(&stock)?;
            let alert = alert::check_restock(&ctx, Utc::now()).await?;
            print_json(&json!({
                "name": name,
                "category": category,
                "item": item,
                "status": classify(&item),
                "restock_alert": alert.is_some(),
            }))?;
        }
        StockAction::Import { path } => {
            let content = std::fs::read_to_string(&path)?;
            let stock: Stock = serde_json::from_str(&content)?;
            ctx.store.save_stock(&stock)?;
            let alert = alert::check_restock(&ctx, Utc::now()).await?;
            print_json(&json!({
                "imported": stock.len(),
                "restock_alert": alert.is_some(),
            }))?;
        }
        StockAction::Export => print_json(&ctx.store.stock()?)?,
    }
    Ok(())
}
