//! # TaskMaster Core Library
//!
//! This library provides the core business logic for the TaskMaster task
//! tracker. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any GUI being a thin layer
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Deadline Engine**: A clock-driven evaluation pass that classifies
//!   every task's urgency, gates alerts so each tier fires at most once per
//!   task, and persists the fired flags
//! - **Ranking**: Pure filtering and ordering of the task list
//! - **Storage**: SQLite-based task storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`DeadlineMonitor`]: Periodic deadline evaluator with a cancelable loop
//! - [`classify`] / [`due_alerts`]: The pure classification and gating steps
//! - [`TaskDb`]: Task and session persistence
//! - [`Config`]: Application configuration management
//! - [`Notifier`]: Trait for alert delivery backends

pub mod clock;
pub mod deadline;
pub mod error;
pub mod events;
pub mod notify;
pub mod ranking;
pub mod storage;
pub mod task;

pub use clock::{Clock, ManualClock, SystemClock};
pub use deadline::{
    classify, due_alerts, Classification, DeadlineMonitor, MonitorConfig, MonitorHandle,
    TaskStore, Tier,
};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use notify::{alert_message, AlertMessage, ConsoleNotifier, Notifier};
pub use ranking::{rank, SortBy, TaskQuery};
pub use storage::{data_dir, Config, TaskDb};
pub use task::{AlertKind, Category, NotifiedFlags, Priority, Task};
