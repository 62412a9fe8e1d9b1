//! Monitor evaluation events.
//!
//! Every evaluation pass produces events; the CLI prints them and the
//! monitor loop logs them. They are plain data so a GUI layer can render
//! what fired without parsing log output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deadline::Tier;
use crate::task::AlertKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An alert crossed the gate and was handed to the notifier.
    AlertFired {
        task_id: String,
        description: String,
        kind: AlertKind,
        tier: Tier,
        minutes_left: Option<i64>,
        /// Whether the notifier call succeeded. Delivery failure does not
        /// block flag persistence.
        delivered: bool,
        /// Whether the flag write landed. A false here means the alert will
        /// be retried as still-due on the next tick.
        persisted: bool,
        at: DateTime<Utc>,
    },
    /// One full pass over the owner's tasks finished.
    TickCompleted {
        evaluated: usize,
        fired: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_alert(&self) -> bool {
        matches!(self, Event::AlertFired { .. })
    }
}
