//! Task list filtering and ordering.
//!
//! A pure read path over a store snapshot: filter by owner, search text,
//! category and priority, then order by one of the supported keys. Inputs
//! are never mutated and repeated calls with the same inputs produce the
//! same sequence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::task::{Category, Priority, Task};

/// Ordering key for ranked task lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Ascending by combined date+time; tasks with no deadline sort last.
    DueDate,
    /// High first.
    Priority,
    /// Newest first.
    CreatedAt,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::DueDate
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortBy::DueDate => "due_date",
            SortBy::Priority => "priority",
            SortBy::CreatedAt => "created_at",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "due_date" | "due" => Ok(SortBy::DueDate),
            "priority" => Ok(SortBy::Priority),
            "created_at" | "created" => Ok(SortBy::CreatedAt),
            other => Err(ValidationError::InvalidValue {
                field: "sort_by".to_string(),
                message: format!("expected due_date, priority or created_at, got '{other}'"),
            }),
        }
    }
}

/// Filter and ordering for one ranked view of the task list.
///
/// `None` for category or priority means the wildcard "All". An empty
/// search string matches every description.
#[derive(Debug, Clone)]
pub struct TaskQuery {
    pub owner_id: String,
    pub search_text: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub sort_by: SortBy,
}

impl TaskQuery {
    /// Unfiltered, default-sorted view of one owner's tasks.
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            search_text: String::new(),
            category: None,
            priority: None,
            sort_by: SortBy::default(),
        }
    }

    pub fn with_search(mut self, search_text: impl Into<String>) -> Self {
        self.search_text = search_text.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }
}

/// Filter and order a snapshot of tasks.
///
/// Ties under every ordering preserve the snapshot's insertion order (the
/// sorts are stable).
pub fn rank(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    let needle = query.search_text.trim().to_lowercase();

    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|t| t.owner_id == query.owner_id)
        .filter(|t| needle.is_empty() || t.description.to_lowercase().contains(&needle))
        .filter(|t| query.category.map_or(true, |c| t.category == c))
        .filter(|t| query.priority.map_or(true, |p| t.priority == p))
        .cloned()
        .collect();

    match query.sort_by {
        SortBy::DueDate => out.sort_by_key(|t| (t.deadline().is_none(), t.deadline())),
        SortBy::Priority => out.sort_by_key(|t| t.priority.sort_rank()),
        SortBy::CreatedAt => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    out
}
