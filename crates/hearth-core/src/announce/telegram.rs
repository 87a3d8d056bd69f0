//! Telegram message bodies (Markdown).

use crate::monitor::{TimerDuration, TimerSlot};
use crate::pantry::{
    all_missing_ingredients, has_available_meals, low_stock_items, missing_item_names, DailyMenu,
    FoodMenu, LowStockItem, Stock,
};
use crate::tasks::{Reminder, Task, TaskKind};

use super::plural;

fn menu_block(menu: &DailyMenu) -> String {
    format!(
        "🌅 Breakfast: {}\n➕ Add-ons: {}\n🌞 Lunch: {}\n🌙 Dinner: {}\n🍿 Snacks: {}",
        menu.breakfast, menu.addons, menu.lunch, menu.dinner, menu.snacks
    )
}

pub fn menu_update(today: &DailyMenu, tomorrow: &DailyMenu) -> String {
    format!(
        "🍽️ *Daily Menu Update*\n\n*Today's Menu:*\n{}\n\n*Tomorrow's Menu:*\n{}",
        menu_block(today),
        menu_block(tomorrow)
    )
}

fn task_line(t: &Task) -> String {
    format!("{} {} (Due: {})\n", t.priority.marker(), t.task, t.due_time)
}

pub fn task_reminder(tasks: &[&Task]) -> String {
    if tasks.is_empty() {
        return "✅ *Task Update*\n\nNo pending tasks for today! Great job! 🎉".into();
    }

    let mut message = format!(
        "📋 *Task Reminder*\n\nYou have {} pending task{}:\n\n",
        tasks.len(),
        plural(tasks.len())
    );
    let todo: Vec<_> = tasks.iter().filter(|t| t.kind == TaskKind::Todo).collect();
    let shopping: Vec<_> = tasks.iter().filter(|t| t.kind == TaskKind::Shopping).collect();
    if !todo.is_empty() {
        message.push_str("*Todo Tasks:*\n");
        for t in &todo {
            message.push_str(&task_line(t));
        }
        message.push('\n');
    }
    if !shopping.is_empty() {
        message.push_str("*Shopping Tasks:*\n");
        for t in &shopping {
            message.push_str(&task_line(t));
        }
    }
    message
}

pub fn low_stock_alert(items: &[LowStockItem]) -> String {
    if items.is_empty() {
        return "📦 *Stock Update*\n\nAll items are well stocked! 👍".into();
    }

    let mut message = format!(
        "⚠️ *Low Stock Alert*\n\nYou have {} item{} running low:\n\n",
        items.len(),
        plural(items.len())
    );
    for item in items {
        message.push_str(&format!("• {}\n", item.name.replace('_', " ")));
    }
    message.push_str("\n🛒 Consider restocking these items soon!");
    message
}

/// Mirror of a spoken announcement, sent silently.
pub fn voice_announcement(content: &str) -> String {
    format!("🔊 *Voice Announcement*\n\n{content}")
}

/// Sent when a pending task reaches its due time.
pub fn task_due(task: &Task) -> String {
    format!(
        "⏰ *Task Reminder*\n\n{} {} {}\n\nDue now!",
        task.icon(),
        task.priority.marker(),
        task.task
    )
}

/// Sent when a recurring reminder reaches its time.
pub fn recurring_reminder(reminder: &Reminder) -> String {
    format!(
        "🔔 *Recurring Reminder*\n\n{} {}\n\nFrequency: {}",
        reminder.category.icon(),
        reminder.task,
        reminder.frequency
    )
}

pub fn daily_update(
    menu: &DailyMenu,
    tasks: &[&Task],
    reminders: &[&Reminder],
    low: &[LowStockItem],
) -> String {
    let mut message = String::from("📱 *Daily Smart Assistant Update*\n\n");

    message.push_str("🍽️ *Today's Menu:*\n");
    message.push_str(&format!("🌅 {} + {}\n", menu.breakfast, menu.addons));
    message.push_str(&format!("🌞 {}\n", menu.lunch));
    message.push_str(&format!("🌙 {}\n", menu.dinner));
    message.push_str(&format!("🍿 {}\n\n", menu.snacks));

    if tasks.is_empty() {
        message.push_str("✅ *No pending tasks today!*\n\n");
    } else {
        message.push_str(&format!("📋 *Pending Tasks ({}):*\n", tasks.len()));
        for t in tasks.iter().take(5) {
            message.push_str(&format!("{} {} {}\n", t.icon(), t.priority.marker(), t.task));
        }
        if tasks.len() > 5 {
            message.push_str(&format!("... and {} more tasks\n", tasks.len() - 5));
        }
        message.push('\n');
    }

    if !reminders.is_empty() {
        message.push_str(&format!("🔔 *Today's Reminders ({}):*\n", reminders.len()));
        for r in reminders.iter().take(3) {
            message.push_str(&format!("• {} ({})\n", r.task, r.due_time));
        }
        if reminders.len() > 3 {
            message.push_str(&format!("... and {} more reminders\n", reminders.len() - 3));
        }
        message.push('\n');
    }

    if low.is_empty() {
        message.push_str("📦 *All items well stocked!*\n");
    } else {
        message.push_str(&format!("⚠️ *Low Stock Items ({}):*\n", low.len()));
        for item in low.iter().take(5) {
            message.push_str(&format!("📦 {}\n", item.name.replace('_', " ")));
        }
        if low.len() > 5 {
            message.push_str(&format!("... and {} more items\n", low.len() - 5));
        }
    }

    message.push_str("\n🤖 Have a great day!");
    message
}

pub fn critical_restock(missing_items: &[String]) -> String {
    let list = missing_items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "🚨 *CRITICAL STOCK ALERT* 🚨\n\n⚠️ No meals can be prepared with current stock!\n\n📝 *Missing Ingredients:*\n{list}\n\n🛒 Please restock these items immediately!\n📱 Items have been added to your shopping list."
    )
}

pub fn stock_warning(items: &[LowStockItem]) -> String {
    let list = items
        .iter()
        .map(|item| {
            let threshold = item
                .threshold
                .map(|t| format!(" (threshold: {t})"))
                .unwrap_or_default();
            format!("• {}: {} {} left{threshold}", item.name, item.quantity, item.unit)
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "📦 *Stock Warning* 📦\n\n⚠️ Some ingredients are running low:\n\n{list}\n\n🛒 Consider restocking soon to avoid meal preparation issues."
    )
}

/// Critical alert when nothing can be cooked, a warning when only some
/// items are low, else nothing to send.
pub fn restock_alert(food: &FoodMenu, stock: &Stock) -> Option<String> {
    if !has_available_meals(food, stock) {
        let missing = missing_item_names(&all_missing_ingredients(food, stock));
        return Some(critical_restock(&missing));
    }
    let low = low_stock_items(stock);
    (!low.is_empty()).then(|| stock_warning(&low))
}

pub fn timer_fired(slot: TimerSlot, body: &str) -> String {
    format!("⏰ *WiFi Monitor - Timer {}*\n\n{body}", slot.number())
}

/// Body shared by the desktop notification, the modal and Telegram.
pub fn timer_body(duration: TimerDuration) -> String {
    let verb = if duration.amount == 1 { "has" } else { "have" };
    format!("{duration} {verb} passed since your first WiFi connection today!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pantry::{StockCategory, StockItem, StockStatus};
    use crate::tasks::{ReminderCategory, ReminderFrequency, TaskPriority};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn low(name: &str, threshold: Option<f64>) -> LowStockItem {
        LowStockItem {
            name: name.into(),
            category: StockCategory::Groceries,
            status: StockStatus::LowStock,
            quantity: 0.5,
            unit: "kg".into(),
            threshold,
        }
    }

    #[test]
    fn menu_update_lists_both_days() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let text = menu_update(&DailyMenu::unplanned(d), &DailyMenu::unplanned(d));
        assert!(text.starts_with("🍽️ *Daily Menu Update*\n\n*Today's Menu:*\n🌅 Breakfast: No meal planned"));
        assert!(text.contains("\n\n*Tomorrow's Menu:*\n"));
        assert!(text.ends_with("🍿 Snacks: No snack planned"));
    }

    #[test]
    fn task_reminder_marks_priority() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let mut todo = Task::urgent_purchase("x", now);
        todo.kind = TaskKind::Todo;
        todo.task = "Call plumber".into();
        todo.priority = TaskPriority::Medium;
        let buy = Task::urgent_purchase("dal", now);
        let text = task_reminder(&[&todo, &buy]);
        assert!(text.contains("You have 2 pending tasks:"));
        assert!(text.contains("*Todo Tasks:*\n🟡 Call plumber (Due: 09:30)\n\n*Shopping Tasks:*\n🔴 🚨 URGENT: Buy dal (Due: 09:30)\n"));
        assert!(task_reminder(&[]).contains("No pending tasks"));
    }

    #[test]
    fn daily_update_sections() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let items: Vec<_> = (0..7).map(|i| low(&format!("item_{i}"), None)).collect();
        let text = daily_update(&DailyMenu::unplanned(d), &[], &[], &items);
        assert!(text.contains("🌅 No meal planned + No addon planned\n"));
        assert!(text.contains("✅ *No pending tasks today!*"));
        assert!(text.contains("⚠️ *Low Stock Items (7):*\n📦 item 0\n"));
        assert!(text.contains("... and 2 more items\n"));
        assert!(text.ends_with("🤖 Have a great day!"));
    }

    #[test]
    fn daily_update_lists_todays_reminders() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        let reminders: Vec<Reminder> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| Reminder::new(*n, ReminderCategory::Work, ReminderFrequency::Weekly, "18:00", d, now))
            .collect();
        let refs: Vec<&Reminder> = reminders.iter().collect();
        let text = daily_update(&DailyMenu::unplanned(d), &[], &refs, &[]);
        assert!(text.contains(
            "✅ *No pending tasks today!*\n\n🔔 *Today's Reminders (4):*\n• a (18:00)\n• b (18:00)\n• c (18:00)\n... and 1 more reminders\n\n📦"
        ));
        let none = daily_update(&DailyMenu::unplanned(d), &[], &[], &[]);
        assert!(!none.contains("Reminders"));
    }

    #[test]
    fn due_time_reminders() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let buy = Task::urgent_purchase("dal", now);
        assert_eq!(
            task_due(&buy),
            "⏰ *Task Reminder*\n\n🛒 🔴 🚨 URGENT: Buy dal\n\nDue now!"
        );
        let r = Reminder::new(
            "Take vitamins",
            ReminderCategory::Health,
            ReminderFrequency::Daily,
            "08:00",
            now.date_naive(),
            now,
        );
        assert_eq!(
            recurring_reminder(&r),
            "🔔 *Recurring Reminder*\n\n🏥 Take vitamins\n\nFrequency: daily"
        );
    }

    #[test]
    fn low_stock_and_warning_formats() {
        assert!(low_stock_alert(&[]).contains("well stocked"));
        let text = low_stock_alert(&[low("green_chili", None)]);
        assert!(text.contains("You have 1 item running low:\n\n• green chili\n"));
        let warn = stock_warning(&[low("rice", Some(1.0)), low("salt", None)]);
        assert!(warn.contains("• rice: 0.5 kg left (threshold: 1)\n• salt: 0.5 kg left"));
    }

    #[test]
    fn restock_alert_variants() {
        let food = FoodMenu::default();
        let mut stock = Stock::default();
        assert!(restock_alert(&food, &stock).unwrap().contains("CRITICAL STOCK ALERT"));
        let mut food = food;
        food.snacks.push(crate::pantry::Dish::new("Tea"));
        assert_eq!(restock_alert(&food, &stock), None);
        stock.upsert(StockCategory::Vegetables, "onion", StockItem::new("kg", 0.0));
        assert!(restock_alert(&food, &stock).unwrap().starts_with("📦 *Stock Warning*"));
    }

    #[test]
    fn timer_texts() {
        assert_eq!(
            timer_body(TimerDuration::hours(7)),
            "7 hours have passed since your first WiFi connection today!"
        );
        assert_eq!(
            timer_fired(TimerSlot::Timer2, "x"),
            "⏰ *WiFi Monitor - Timer 2*\n\nx"
        );
    }
}
