//! Deadline monitoring engine.
//!
//! Three layers, data flowing one direction per tick:
//!
//! ```text
//! Clock -> classifier -> gate -> monitor -> Notifier
//!                                   |
//!                                   +--> TaskStore (flag writes)
//! ```
//!
//! [`classify`] is a pure urgency function, [`due_alerts`] decides which
//! alerts still owe a delivery, and [`DeadlineMonitor`] drives the periodic
//! evaluation pass over the signed-in owner's tasks.

pub mod classifier;
pub mod gate;
pub mod monitor;

pub use classifier::{classify, Classification, Tier};
pub use gate::due_alerts;
pub use monitor::{DeadlineMonitor, MonitorConfig, MonitorHandle, TaskStore};
