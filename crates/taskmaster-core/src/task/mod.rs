//! Task types and the per-task notification flag set.
//!
//! A task is owned by exactly one user and optionally carries a deadline as
//! a calendar date plus time-of-day. The [`NotifiedFlags`] value object
//! records which alert tiers have already been delivered for the task; the
//! deadline monitor is its only writer.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: high sorts first.
    pub fn sort_rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::InvalidValue {
                field: "priority".to_string(),
                message: format!("expected high, medium or low, got '{other}'"),
            }),
        }
    }
}

/// Category of task for organizing work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Work,
    Shopping,
    Health,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Category::Personal
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Shopping => "shopping",
            Category::Health => "health",
            Category::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "work" => Ok(Category::Work),
            "shopping" => Ok(Category::Shopping),
            "health" => Ok(Category::Health),
            "other" => Ok(Category::Other),
            unknown => Err(ValidationError::InvalidValue {
                field: "category".to_string(),
                message: format!(
                    "expected personal, work, shopping, health or other, got '{unknown}'"
                ),
            }),
        }
    }
}

/// One deliverable alert per task, keyed by the flag it sets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    /// Due within the hour.
    Hour,
    /// Due within 30 minutes.
    ThirtyMin,
    /// Deadline has passed.
    Overdue,
}

impl AlertKind {
    /// All kinds, ordered from least to most urgent. Catch-up firing walks
    /// this order so a task that skipped tiers still alerts hour -> thirtyMin
    /// -> overdue within one tick.
    pub const ALL: [AlertKind; 3] = [AlertKind::Hour, AlertKind::ThirtyMin, AlertKind::Overdue];
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertKind::Hour => "hour",
            AlertKind::ThirtyMin => "thirtyMin",
            AlertKind::Overdue => "overdue",
        };
        write!(f, "{s}")
    }
}

/// Which alerts have already been delivered for a task.
///
/// Monotonic under monitoring: the monitor only ever sets flags. The single
/// legitimate reset is a task edit that changes the due date or time, because
/// the deadline the flags refer to no longer exists.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedFlags {
    #[serde(default)]
    pub hour: bool,
    #[serde(default)]
    pub thirty_min: bool,
    #[serde(default)]
    pub overdue: bool,
}

impl NotifiedFlags {
    pub fn is_set(&self, kind: AlertKind) -> bool {
        match kind {
            AlertKind::Hour => self.hour,
            AlertKind::ThirtyMin => self.thirty_min,
            AlertKind::Overdue => self.overdue,
        }
    }

    pub fn set(&mut self, kind: AlertKind) {
        match kind {
            AlertKind::Hour => self.hour = true,
            AlertKind::ThirtyMin => self.thirty_min = true,
            AlertKind::Overdue => self.overdue = true,
        }
    }

    /// Re-arm all alerts. Only valid when the deadline itself changed.
    pub fn reset(&mut self) {
        *self = NotifiedFlags::default();
    }

    pub fn any(&self) -> bool {
        self.hour || self.thirty_min || self.overdue
    }
}

/// A tracked task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Owning user; every read and mutation is scoped to this.
    pub owner_id: String,
    /// What needs doing. Non-empty after trimming.
    pub description: String,
    /// Optional due calendar date.
    pub due_date: Option<NaiveDate>,
    /// Optional due time-of-day.
    pub due_time: Option<NaiveTime>,
    /// Task priority (default medium).
    #[serde(default)]
    pub priority: Priority,
    /// Task category (default personal).
    #[serde(default)]
    pub category: Category,
    /// Delivered-alert flags, all false at creation.
    #[serde(default)]
    pub notified: NotifiedFlags,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with default values. The description is trimmed.
    pub fn new(owner_id: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            description: description.into().trim().to_string(),
            due_date: None,
            due_time: None,
            priority: Priority::default(),
            category: Category::default(),
            notified: NotifiedFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style deadline assignment.
    pub fn with_deadline(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.due_date = Some(date);
        self.due_time = Some(time);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// The combined deadline, if the task has one.
    ///
    /// Both the date and the time-of-day must be present; a task with only
    /// one of them has no deadline and is exempt from monitoring.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        let date = self.due_date?;
        let time = self.due_time?;
        Some(NaiveDateTime::new(date, time).and_utc())
    }

    /// Validate invariants enforced at the storage boundary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "description".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "owner_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
