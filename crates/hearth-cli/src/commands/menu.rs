use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use clap::Subcommand;
use hearth_core::pantry::nutrition::{
    fiber_rich_dishes, menu_nutrition, protein_rich_dishes, suggestions, summary, weekly_average,
    NutritionLevel, Person,
};
use hearth_core::pantry::{
    all_missing_ingredients, available_dishes, cook, has_available_meals, Dish, FoodMenu,
    MealType, Stock,
};
use hearth_core::Event;
use serde_json::json;
use tracing::warn;

use super::{alert, print_json, today, CliResult, Context};

#[derive(Subcommand)]
pub enum MenuAction {
    /// Show the planned menus (today and tomorrow by default)
    Show {
        /// Show a single day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Plan a specific dish for a meal slot
    Set {
        /// breakfast, addons, lunch, dinner or snacks
        meal: MealType,
        /// Dish name
        dish: String,
        /// Day to plan (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Advance a meal slot to the next dish that can be cooked
    Rotate {
        /// breakfast, addons, lunch, dinner or snacks
        meal: MealType,
        /// Day to rotate (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Cook a dish and deduct its ingredients from the stock
    Cook {
        /// breakfast, addons, lunch, dinner or snacks
        meal: MealType,
        /// Dish name (defaults to today's planned dish)
        dish: Option<String>,
    },
    /// Report the missing ingredients of every dish that cannot be cooked
    Missing,
    /// List the dishes that can be cooked right now
    Available {
        /// Limit to one meal slot
        meal: Option<MealType>,
    },
    /// Replace the recipe book from a JSON file
    Import {
        /// File with one dish list per meal slot
        path: PathBuf,
    },
    /// Protein and fiber against the household's goals
    Nutrition {
        /// Day to summarize (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

/// Minimum grams for a dish to be listed as protein- or fiber-rich.
const PROTEIN_RICH: f64 = 8.0;
const FIBER_RICH: f64 = 5.0;

fn available_by_meal(food: &FoodMenu, stock: &Stock, meals: &[MealType]) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = meals
        .iter()
        .map(|meal| (meal.to_string(), json!(available_dishes(food, stock, *meal))))
        .collect();
    serde_json::Value::Object(map)
}

pub async fn run(action: MenuAction) -> CliResult {
    let ctx = Context::load()?;
    let today = today();
    match action {
        MenuAction::Show { date } => {
            let plan = ctx.store.menu_plan(today)?;
            match date {
                Some(date) => print_json(&plan.menu_for(date))?,
                None => print_json(&json!({
                    "today": plan.menu_for(today),
                    "tomorrow": plan.menu_for(today + Duration::days(1)),
                }))?,
            }
        }
        MenuAction::Set { meal, dish, date } => {
            let date = date.unwrap_or(today);
            let food = ctx.store.food_menu()?;
            if food.find(meal, &dish).is_none() {
                warn!(%meal, %dish, "dish is not in the recipe book");
            }
            let mut plan = ctx.store.menu_plan(today)?;
            plan.set_dish(date, meal, dish);
            ctx.store.save_menu_plan(&plan)?;
            print_json(&plan.menu_for(date))?;
        }
        MenuAction::Rotate { meal, date } => {
            let date = date.unwrap_or(today);
            let mut plan = ctx.store.menu_plan(today)?;
            let food = ctx.store.food_menu()?;
            let stock = ctx.store.stock()?;
            let rotation = plan.rotate(date, meal, &food, &stock);
            ctx.store.save_menu_plan(&plan)?;
            print_json(&Event::MealRotated {
                date: rotation.date,
                meal: rotation.meal,
                from: rotation.from,
                to: rotation.to,
            })?;
        }
        MenuAction::Cook { meal, dish } => {
            let dish = match dish {
                Some(dish) => dish,
                None => ctx.store.menu_plan(today)?.menu_for(today).dish(meal).to_string(),
            };
            let food = ctx.store.food_menu()?;
            let stock = ctx.store.stock()?;
            let depleted = cook(&food, &stock, meal, &dish)?;
            ctx.store.save_stock(&depleted)?;
            let now = Utc::now();
            let alert = alert::check_restock(&ctx, now).await?;
            print_json(&json!({
                "event": Event::DishCooked { meal, dish, at: now },
                "restock_alert": alert.is_some(),
            }))?;
        }
        MenuAction::Missing => {
            let food = ctx.store.food_menu()?;
            let stock = ctx.store.stock()?;
            print_json(&all_missing_ingredients(&food, &stock))?;
        }
        MenuAction::Available { meal } => {
            let food = ctx.store.food_menu()?;
            let stock = ctx.store.stock()?;
            let meals = match meal {
                Some(meal) => vec![meal],
                None => MealType::ALL.to_vec(),
            };
            print_json(&available_by_meal(&food, &stock, &meals))?;
        }
        MenuAction::Import { path } => {
            let content = std::fs::read_to_string(&path)?;
            let food: FoodMenu = serde_json::from_str(&content)?;
            ctx.store.save_food_menu(&food)?;
            let stock = ctx.store.stock()?;
            // New recipes re-baseline the restock edge.
            let mut monitor = ctx.store.restock_monitor()?;
            monitor.reset(has_available_meals(&food, &stock));
            ctx.store.save_restock_monitor(&monitor)?;
            let dishes: usize = food.iter().map(|(_, d)| d.len()).sum();
            print_json(&json!({ "imported_dishes": dishes }))?;
        }
        MenuAction::Nutrition { date } => {
            let date = date.unwrap_or(today);
            let plan = ctx.store.menu_plan(today)?;
            let food = ctx.store.food_menu()?;
            let menu = plan.menu_for(date);
            let goals = &ctx.config.household.nutrition_goals;
            let names = &ctx.config.household.user_info;

            let person = |who: Person, name: &str| {
                let s = summary(&menu, &food, goals, who);
                let level = |p| {
                    let level = NutritionLevel::from_progress(p);
                    json!({ "level": level, "message": level.message() })
                };
                json!({
                    "name": name,
                    "summary": s,
                    "protein_status": level(s.protein_progress),
                    "fiber_status": level(s.fiber_progress),
                    "suggestions": suggestions(&s),
                })
            };

            let week: Vec<_> = (0..7)
                .filter_map(|back| plan.get(date - Duration::days(back)).cloned())
                .collect();
            let names_of = |dishes: Vec<&Dish>| {
                dishes.iter().map(|d| d.name.clone()).collect::<Vec<_>>()
            };

            print_json(&json!({
                "date": date,
                "totals": menu_nutrition(&menu, &food),
                "user": person(Person::User, &names.user_name),
                "spouse": person(Person::Spouse, &names.spouse_name),
                "weekly_average": weekly_average(&week, &food),
                "protein_rich": names_of(protein_rich_dishes(&food, PROTEIN_RICH)),
                "fiber_rich": names_of(fiber_rich_dishes(&food, FIBER_RICH)),
            }))?;
        }
    }
    Ok(())
}
