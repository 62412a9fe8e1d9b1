//! Alert delivery boundary.
//!
//! The monitor composes a tier-specific message and hands it to a
//! [`Notifier`]. Delivery mechanics (desktop toasts, sound, speech, push)
//! live entirely behind the trait; the monitor neither retries nor depends
//! on delivery success.

use crate::task::{AlertKind, Task};

/// Delivers one alert. Implementations are free to dedupe or replace
/// in-flight alerts by `tag`, which always equals the task id.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str, tag: &str) -> Result<(), Box<dyn std::error::Error>>;
}

/// A composed, ready-to-deliver alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
    /// Equal to the task id, for delivery-layer dedupe.
    pub tag: String,
}

/// Build the tier-specific message for an alert.
pub fn alert_message(task: &Task, kind: AlertKind) -> AlertMessage {
    let (title, body) = match kind {
        AlertKind::Hour => (
            "Task due soon",
            format!("\"{}\" is due within the hour", task.description),
        ),
        AlertKind::ThirtyMin => (
            "Task due very soon",
            format!("\"{}\" is due within 30 minutes", task.description),
        ),
        AlertKind::Overdue => (
            "Task overdue",
            format!("\"{}\" is past its deadline", task.description),
        ),
    };
    AlertMessage {
        title: title.to_string(),
        body,
        tag: task.id.clone(),
    }
}

/// Renders alerts to stdout. The CLI's delivery layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, body: &str, tag: &str) -> Result<(), Box<dyn std::error::Error>> {
        println!("[{tag}] {title}: {body}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_tier_specific_and_tagged() {
        let task = Task::new("user-1", "submit expenses");

        let hour = alert_message(&task, AlertKind::Hour);
        assert_eq!(hour.title, "Task due soon");
        assert!(hour.body.contains("submit expenses"));
        assert_eq!(hour.tag, task.id);

        let overdue = alert_message(&task, AlertKind::Overdue);
        assert_eq!(overdue.title, "Task overdue");
        assert_ne!(hour.body, overdue.body);
    }
}
