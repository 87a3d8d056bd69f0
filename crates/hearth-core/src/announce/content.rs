//! Spoken announcement text.

use crate::pantry::{
    all_missing_ingredients, has_available_meals, low_stock_items, missing_item_names, DailyMenu,
    FoodMenu, Stock,
};
use crate::tasks::{Reminder, Task, TaskKind};

use super::{plural, Briefing, ContentType};

pub fn greeting(user_name: &str, hour: u32) -> String {
    let time_of_day = if hour < 12 {
        "Good morning"
    } else if hour < 17 {
        "Good afternoon"
    } else {
        "Good evening"
    };
    format!("{time_of_day}, {user_name}!")
}

pub fn menu_announcement(menu: &DailyMenu, is_today: bool) -> String {
    let day = if is_today { "today's" } else { "tomorrow's" };
    format!(
        "Here's {day} menu. For breakfast: {}, with {}. For lunch: {}. For dinner: {}. And for snacks: {}.",
        menu.breakfast, menu.addons, menu.lunch, menu.dinner, menu.snacks
    )
}

fn first_three<'a>(names: impl ExactSizeIterator<Item = &'a str>) -> String {
    let total = names.len();
    let mut text = names.take(3).collect::<Vec<_>>().join(", ");
    if total > 3 {
        text.push_str(&format!(" and {} more", total - 3));
    }
    text
}

/// Summary of today's pending tasks, todo items before shopping items.
pub fn tasks_announcement(tasks: &[&Task]) -> String {
    if tasks.is_empty() {
        return "You have no pending tasks for today. Great job staying organized!".into();
    }

    let (shopping, todo): (Vec<&Task>, Vec<&Task>) =
        tasks.iter().copied().partition(|t| t.kind == TaskKind::Shopping);

    let mut text = format!(
        "You have {} pending task{} for today. ",
        tasks.len(),
        plural(tasks.len())
    );
    if !todo.is_empty() {
        text.push_str(&format!(
            "{} todo item{}: {}. ",
            todo.len(),
            plural(todo.len()),
            first_three(todo.iter().map(|t| t.task.as_str()))
        ));
    }
    if !shopping.is_empty() {
        text.push_str(&format!(
            "{} shopping item{}: {}. ",
            shopping.len(),
            plural(shopping.len()),
            first_three(shopping.iter().map(|t| t.task.as_str()))
        ));
    }
    text
}

pub fn reminders_announcement(reminders: &[&Reminder]) -> String {
    if reminders.is_empty() {
        return "No reminders for today.".into();
    }
    format!(
        "You have {} reminder{} today: {}.",
        reminders.len(),
        plural(reminders.len()),
        first_three(reminders.iter().map(|r| r.task.as_str()))
    )
}

/// Spoken when a pending task reaches its due time.
pub fn task_due(task: &Task) -> String {
    format!("Reminder: {} is due now. Priority: {}.", task.task, task.priority)
}

/// Spoken when a recurring reminder reaches its time.
pub fn recurring_reminder(reminder: &Reminder) -> String {
    format!(
        "Reminder: {}. This is a {} reminder.",
        reminder.task, reminder.frequency
    )
}

pub fn low_stock_announcement(stock: &Stock) -> String {
    let low = low_stock_items(stock);
    if low.is_empty() {
        return "All items are well stocked.".into();
    }

    let names = low
        .iter()
        .take(5)
        .map(|item| item.name.replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = format!(
        "Attention! You have {} item{} running low: {names}",
        low.len(),
        plural(low.len())
    );
    if low.len() > 5 {
        text.push_str(&format!(" and {} more items", low.len() - 5));
    }
    text.push_str(". Please consider restocking soon.");
    text
}

pub fn critical_restock(missing_items: &[String]) -> String {
    format!(
        "Critical alert! No meals can be prepared with current stock. Please restock the following items immediately: {}. I've added these to your shopping list.",
        missing_items.join(", ")
    )
}

/// Restock line for a scheduled announcement: critical when nothing can be
/// cooked, a softer warning when only some items are low, else nothing.
pub fn restock_alert(food: &FoodMenu, stock: &Stock) -> Option<String> {
    if !has_available_meals(food, stock) {
        let missing = missing_item_names(&all_missing_ingredients(food, stock));
        return Some(critical_restock(&missing));
    }
    let low = low_stock_items(stock);
    if low.is_empty() {
        return None;
    }
    let names = low
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "Stock alert: The following items are running low: {names}. Consider restocking soon."
    ))
}

/// Concatenate the requested sections in a fixed order.
pub fn full_announcement(briefing: &Briefing<'_>, content: &[ContentType]) -> String {
    let mut parts = Vec::new();
    let wants = |t: ContentType| content.contains(&t);

    if wants(ContentType::Greeting) {
        parts.push(greeting(briefing.user_name, briefing.hour()));
    }
    if wants(ContentType::MenuToday) {
        parts.push(menu_announcement(briefing.today_menu, true));
    }
    if wants(ContentType::MenuTomorrow) {
        parts.push(menu_announcement(briefing.tomorrow_menu, false));
    }
    if wants(ContentType::Tasks) {
        parts.push(tasks_announcement(&briefing.todays_tasks()));
    }
    if wants(ContentType::Reminders) {
        parts.push(reminders_announcement(&briefing.todays_reminders()));
    }
    if wants(ContentType::LowStock) {
        parts.push(low_stock_announcement(briefing.stock));
    }
    if wants(ContentType::RestockAlert) {
        if let Some(alert) = restock_alert(briefing.food, briefing.stock) {
            parts.push(alert);
        }
    }
    parts
        .iter()
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pantry::{Dish, StockCategory, StockItem};
    use crate::tasks::{ReminderCategory, ReminderFrequency};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn task(kind: TaskKind, name: &str) -> Task {
        let mut t = Task::urgent_purchase(name, Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
        t.kind = kind;
        t.task = name.into();
        t
    }

    #[test]
    fn greeting_by_hour() {
        assert_eq!(greeting("Asha", 6), "Good morning, Asha!");
        assert_eq!(greeting("Asha", 12), "Good afternoon, Asha!");
        assert_eq!(greeting("Asha", 17), "Good evening, Asha!");
    }

    #[test]
    fn menu_text() {
        let menu = DailyMenu::unplanned(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let text = menu_announcement(&menu, false);
        assert!(text.starts_with("Here's tomorrow's menu. For breakfast: No meal planned, with No addon planned."));
        assert!(text.ends_with("And for snacks: No snack planned."));
    }

    #[test]
    fn tasks_text_groups_and_truncates() {
        assert!(tasks_announcement(&[]).starts_with("You have no pending tasks"));
        let owned: Vec<Task> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| task(TaskKind::Todo, n))
            .chain(std::iter::once(task(TaskKind::Shopping, "milk")))
            .collect();
        let refs: Vec<&Task> = owned.iter().collect();
        assert_eq!(
            tasks_announcement(&refs),
            "You have 5 pending tasks for today. 4 todo items: a, b, c and 1 more. 1 shopping item: milk. "
        );
    }

    #[test]
    fn reminders_text() {
        assert_eq!(reminders_announcement(&[]), "No reminders for today.");
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        let owned: Vec<Reminder> = ["Water plants", "Pay rent", "Walk", "Stretch"]
            .iter()
            .map(|n| Reminder::new(*n, ReminderCategory::Home, ReminderFrequency::Daily, "09:00", day, now))
            .collect();
        let refs: Vec<&Reminder> = owned.iter().collect();
        assert_eq!(
            reminders_announcement(&refs[..1]),
            "You have 1 reminder today: Water plants."
        );
        assert_eq!(
            reminders_announcement(&refs),
            "You have 4 reminders today: Water plants, Pay rent, Walk and 1 more."
        );
        assert_eq!(
            recurring_reminder(&owned[1]),
            "Reminder: Pay rent. This is a daily reminder."
        );
    }

    #[test]
    fn task_due_text() {
        let t = task(TaskKind::Todo, "Call plumber");
        assert_eq!(task_due(&t), "Reminder: Call plumber is due now. Priority: high.");
    }

    #[test]
    fn low_stock_text() {
        let mut stock = Stock::default();
        assert_eq!(low_stock_announcement(&stock), "All items are well stocked.");
        for name in ["a_b", "c", "d", "e", "f", "g", "h"] {
            stock.upsert(StockCategory::Groceries, name, StockItem::new("kg", 0.0));
        }
        assert_eq!(
            low_stock_announcement(&stock),
            "Attention! You have 7 items running low: a b, c, d, e, f and 2 more items. Please consider restocking soon."
        );
    }

    #[test]
    fn restock_line_variants() {
        let mut food = FoodMenu::default();
        food.lunch.push(Dish::new("Rice").with_ingredient("rice", "100g"));
        let mut stock = Stock::default();
        assert!(restock_alert(&food, &stock).unwrap().starts_with("Critical alert!"));

        stock.upsert(
            StockCategory::Groceries,
            "rice",
            StockItem::new("kg", 1.0).with_threshold(1.0),
        );
        assert_eq!(
            restock_alert(&food, &stock).as_deref(),
            Some("Stock alert: The following items are running low: rice. Consider restocking soon.")
        );

        stock.upsert(StockCategory::Groceries, "rice", StockItem::new("kg", 5.0));
        assert_eq!(restock_alert(&food, &stock), None);
    }
}
