use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use hearth_core::announce::schedule::parse_hhmm;
use hearth_core::tasks::{Task, TaskKind, TaskPriority};

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List pending tasks
    List {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },
    /// Add a to-do (or shopping) task
    Add {
        /// What needs doing
        text: String,
        /// Due date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Due time, HH:MM
        #[arg(long, default_value = "09:00")]
        at: String,
        /// high, medium or low
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        /// File it as a shopping item
        #[arg(long)]
        shopping: bool,
    },
    /// Mark a task completed
    Complete {
        /// Task id as shown by `task list`
        id: String,
    },
}

pub async fn run(action: TaskAction) -> CliResult {
    let ctx = Context::load()?;
    match action {
        TaskAction::List { all } => {
            let tasks: Vec<Task> = ctx
                .store
                .tasks()?
                .into_iter()
                .filter(|t| all || t.is_pending())
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Add {
            text,
            due,
            at,
            priority,
            shopping,
        } => {
            parse_hhmm(&at)?;
            let kind = if shopping {
                TaskKind::Shopping
            } else {
                TaskKind::Todo
            };
            let due = due.unwrap_or_else(|| Local::now().date_naive());
            let task = Task::new(kind, text, due, at, priority, Utc::now());
            ctx.store.add_tasks(vec![task.clone()])?;
            print_json(&task)?;
        }
        TaskAction::Complete { id } => {
            let task = ctx
                .store
                .complete_task(&id)?
                .ok_or_else(|| format!("no task with id '{id}'"))?;
            print_json(&task)?;
        }
    }
    Ok(())
}
