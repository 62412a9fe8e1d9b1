//! Urgency classification.
//!
//! Pure function of (task, now). No side effects, no I/O -- repeated calls
//! with the same inputs return the same tier, which is what makes the
//! monitor testable against an injected clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::task::Task;

/// Urgency of a task relative to now.
///
/// Ordered from least to most urgent so the gate can ask "has this task
/// reached at least tier X" with a plain comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// No due date/time set; exempt from monitoring.
    NoDeadline,
    /// More than an hour away.
    Upcoming,
    /// Due within 60 minutes.
    Warning,
    /// Due within 30 minutes.
    Urgent,
    /// Deadline has passed.
    Overdue,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::NoDeadline => "no-deadline",
            Tier::Upcoming => "upcoming",
            Tier::Warning => "warning",
            Tier::Urgent => "urgent",
            Tier::Overdue => "overdue",
        };
        write!(f, "{s}")
    }
}

/// Result of classifying one task at one instant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub tier: Tier,
    /// Whole minutes until the deadline, floored, negative once past it.
    /// None when the task has no deadline.
    pub minutes_left: Option<i64>,
}

/// Classify a task's urgency at `now`.
///
/// Minutes are floored: 29m59s left is 29 minutes, and one second past the
/// deadline is minute -1, so the overdue check is simply `minutes_left < 0`.
pub fn classify(task: &Task, now: DateTime<Utc>) -> Classification {
    let Some(deadline) = task.deadline() else {
        return Classification {
            tier: Tier::NoDeadline,
            minutes_left: None,
        };
    };

    let diff_ms = (deadline - now).num_milliseconds();
    let minutes_left = diff_ms.div_euclid(60_000);

    let tier = if minutes_left < 0 {
        Tier::Overdue
    } else if minutes_left <= 30 {
        Tier::Urgent
    } else if minutes_left <= 60 {
        Tier::Warning
    } else {
        Tier::Upcoming
    };

    Classification {
        tier,
        minutes_left: Some(minutes_left),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn task_due_at(due: DateTime<Utc>) -> Task {
        Task::new("user-1", "test task").with_deadline(due.date_naive(), due.time())
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn no_due_fields_is_no_deadline() {
        let task = Task::new("user-1", "free floating");
        let c = classify(&task, at(9, 0));
        assert_eq!(c.tier, Tier::NoDeadline);
        assert_eq!(c.minutes_left, None);
    }

    #[test]
    fn date_without_time_is_no_deadline() {
        let mut task = Task::new("user-1", "half a deadline");
        task.due_date = Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(classify(&task, at(9, 0)).tier, Tier::NoDeadline);
    }

    #[test]
    fn twenty_five_minutes_left_is_urgent() {
        // Due 10:00, evaluated 09:35.
        let task = task_due_at(at(10, 0));
        let c = classify(&task, at(9, 35));
        assert_eq!(c.tier, Tier::Urgent);
        assert_eq!(c.minutes_left, Some(25));
    }

    #[test]
    fn forty_five_minutes_left_is_warning() {
        let task = task_due_at(at(10, 0));
        let c = classify(&task, at(9, 15));
        assert_eq!(c.tier, Tier::Warning);
        assert_eq!(c.minutes_left, Some(45));
    }

    #[test]
    fn ninety_minutes_left_is_upcoming() {
        let task = task_due_at(at(10, 0));
        assert_eq!(classify(&task, at(8, 30)).tier, Tier::Upcoming);
    }

    #[test]
    fn boundaries_match_thresholds() {
        let task = task_due_at(at(10, 0));
        // Exactly 60 minutes left is warning, 61 is upcoming.
        assert_eq!(classify(&task, at(9, 0)).tier, Tier::Warning);
        assert_eq!(classify(&task, at(8, 59)).tier, Tier::Upcoming);
        // Exactly 30 minutes left is urgent, 31 is warning.
        assert_eq!(classify(&task, at(9, 30)).tier, Tier::Urgent);
        assert_eq!(classify(&task, at(9, 29)).tier, Tier::Warning);
        // Exactly on the deadline is urgent (0 minutes left), not overdue.
        assert_eq!(classify(&task, at(10, 0)).tier, Tier::Urgent);
    }

    #[test]
    fn one_second_past_is_overdue() {
        let task = task_due_at(at(10, 0));
        let c = classify(&task, at(10, 0) + Duration::seconds(1));
        assert_eq!(c.tier, Tier::Overdue);
        assert_eq!(c.minutes_left, Some(-1), "minutes are floored, not truncated");
    }

    #[test]
    fn classification_is_deterministic() {
        let task = task_due_at(at(10, 0));
        let now = at(9, 42);
        let first = classify(&task, now);
        for _ in 0..10 {
            assert_eq!(classify(&task, now), first);
        }
    }

    #[test]
    fn tier_ordering_is_urgency_ordering() {
        assert!(Tier::NoDeadline < Tier::Upcoming);
        assert!(Tier::Upcoming < Tier::Warning);
        assert!(Tier::Warning < Tier::Urgent);
        assert!(Tier::Urgent < Tier::Overdue);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The tier reported always agrees with the minutes remaining.
            #[test]
            fn tier_matches_minutes(offset_secs in -7 * 24 * 3600i64..7 * 24 * 3600i64) {
                let due = at(12, 0);
                let task = task_due_at(due);
                let now = due - Duration::seconds(offset_secs);
                let c = classify(&task, now);
                let minutes = c.minutes_left.unwrap();
                match c.tier {
                    Tier::Overdue => prop_assert!(minutes < 0),
                    Tier::Urgent => prop_assert!((0..=30).contains(&minutes)),
                    Tier::Warning => prop_assert!((31..=60).contains(&minutes)),
                    Tier::Upcoming => prop_assert!(minutes > 60),
                    Tier::NoDeadline => prop_assert!(false, "task has a deadline"),
                }
            }
        }
    }
}
