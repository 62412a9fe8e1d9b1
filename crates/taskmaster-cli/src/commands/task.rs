//! Task management commands for CLI.

use chrono::{NaiveDate, NaiveTime};
use clap::Subcommand;
use taskmaster_core::ranking::{rank, SortBy, TaskQuery};
use taskmaster_core::{Task, TaskDb};

use super::require_session;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// What needs doing
        description: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,
        /// Due time (HH:MM)
        #[arg(long)]
        due_time: Option<String>,
        /// Priority: high, medium or low (default: medium)
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Category: personal, work, shopping, health or other (default: personal)
        #[arg(long, default_value = "personal")]
        category: String,
    },
    /// List tasks
    List {
        /// Keep tasks whose description contains this text
        #[arg(long, default_value = "")]
        search: String,
        /// Filter by category, or "all"
        #[arg(long, default_value = "all")]
        category: String,
        /// Filter by priority, or "all"
        #[arg(long, default_value = "all")]
        priority: String,
        /// Sort key: due_date, priority or created_at
        #[arg(long, default_value = "due_date")]
        sort: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,
        /// New due time (HH:MM)
        #[arg(long)]
        due_time: Option<String>,
        /// Remove the deadline entirely
        #[arg(long)]
        clear_due: bool,
        /// New priority
        #[arg(long)]
        priority: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;

    match action {
        TaskAction::Create {
            description,
            due_date,
            due_time,
            priority,
            category,
        } => {
            let owner = require_session(&db)?;
            let mut task = Task::new(owner, description);
            task.due_date = due_date.as_deref().map(parse_date).transpose()?;
            task.due_time = due_time.as_deref().map(parse_time).transpose()?;
            task.priority = priority.parse()?;
            task.category = category.parse()?;
            db.create_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List {
            search,
            category,
            priority,
            sort,
            json,
        } => {
            let owner = require_session(&db)?;
            let mut query = TaskQuery::for_owner(&owner)
                .with_search(search)
                .sorted_by(sort.parse::<SortBy>()?);
            if !category.eq_ignore_ascii_case("all") {
                query = query.with_category(category.parse()?);
            }
            if !priority.eq_ignore_ascii_case("all") {
                query = query.with_priority(priority.parse()?);
            }

            let tasks = db.list_tasks(&owner)?;
            let ranked = rank(&tasks, &query);
            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else if ranked.is_empty() {
                println!("No tasks.");
            } else {
                for task in &ranked {
                    let due = task
                        .deadline()
                        .map(|d| d.format(" due %Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    println!(
                        "{}  [{}/{}]{}  {}",
                        task.id, task.priority, task.category, due, task.description
                    );
                }
            }
        }
        TaskAction::Get { id } => {
            let task = db
                .get_task(&id)?
                .ok_or_else(|| format!("no task with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Update {
            id,
            description,
            due_date,
            due_time,
            clear_due,
            priority,
            category,
        } => {
            let mut task = db
                .get_task(&id)?
                .ok_or_else(|| format!("no task with id {id}"))?;
            if let Some(description) = description {
                task.description = description.trim().to_string();
            }
            if clear_due {
                task.due_date = None;
                task.due_time = None;
            } else {
                if let Some(date) = due_date.as_deref() {
                    task.due_date = Some(parse_date(date)?);
                }
                if let Some(time) = due_time.as_deref() {
                    task.due_time = Some(parse_time(time)?);
                }
            }
            if let Some(priority) = priority.as_deref() {
                task.priority = priority.parse()?;
            }
            if let Some(category) = category.as_deref() {
                task.category = category.parse()?;
            }
            let stored = db.update_task(&task)?;
            println!("Task updated: {}", stored.id);
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        TaskAction::Delete { id } => {
            db.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD").into())
}

fn parse_time(s: &str) -> Result<NaiveTime, Box<dyn std::error::Error>> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{s}', expected HH:MM").into())
}
