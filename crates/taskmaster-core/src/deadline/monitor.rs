//! Deadline monitor.
//!
//! Drives the periodic evaluation pass: classify every task of the signed-in
//! owner, ask the gate which alerts owe a delivery, hand each to the
//! notifier, and persist the flag immediately -- per flag, not batched, so
//! one failing task never blocks the others.
//!
//! The monitor owns no thread of its own beyond [`DeadlineMonitor::spawn`]:
//! `evaluate` is a plain serialized pass, callable from tests with a manual
//! clock, and the spawned loop is just `evaluate` on a tokio interval with a
//! cooperative shutdown channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::notify::{alert_message, Notifier};
use crate::task::{AlertKind, Task};

use super::classifier::classify;
use super::gate::due_alerts;

/// Task persistence as the monitor sees it: a scoped snapshot read and a
/// per-flag write-back. The monitor never creates or deletes tasks.
pub trait TaskStore: Send + Sync {
    fn list(&self, owner_id: &str) -> Result<Vec<Task>>;
    fn mark_notified(&self, task_id: &str, kind: AlertKind) -> Result<()>;
}

/// Monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between evaluation passes.
    pub tick_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
        }
    }
}

/// Periodic deadline evaluator.
pub struct DeadlineMonitor {
    store: Arc<dyn TaskStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: MonitorConfig,
    /// Serializes evaluation passes. Two concurrent passes could both read a
    /// flag as false and double-fire before either write lands.
    tick_guard: Mutex<()>,
}

impl DeadlineMonitor {
    pub fn new(
        store: Arc<dyn TaskStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_config(store, notifier, clock, MonitorConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn TaskStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
            tick_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one evaluation pass for `owner_id`.
    ///
    /// Idempotent against an unchanged clock and store: everything fired in
    /// one pass is flagged before the pass returns, so an immediate second
    /// pass fires nothing. All collaborator failures are recovered locally;
    /// an empty task list short-circuits without producing events.
    pub fn evaluate(&self, owner_id: &str) -> Vec<Event> {
        let _tick = self.tick_guard.lock().unwrap_or_else(|e| e.into_inner());

        let now = self.clock.now();
        let tasks = match self.store.list(owner_id) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(owner_id, error = %e, "task list unavailable, skipping tick");
                return Vec::new();
            }
        };
        if tasks.is_empty() {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut fired = 0usize;
        for task in &tasks {
            // Each task is judged on the fields read this tick, never on a
            // decision cached across store writes.
            let classification = classify(task, now);
            for kind in due_alerts(&task.notified, classification.tier) {
                let message = alert_message(task, kind);
                let delivered = match self.notifier.notify(&message.title, &message.body, &message.tag)
                {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(task_id = %task.id, error = %e, "notifier failed, alert dropped");
                        false
                    }
                };
                // Persist regardless of delivery: the alert was attempted.
                let persisted = match self.store.mark_notified(&task.id, kind) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            task_id = %task.id,
                            kind = %kind,
                            error = %e,
                            "flag write failed, alert will re-fire next tick"
                        );
                        false
                    }
                };
                fired += 1;
                events.push(Event::AlertFired {
                    task_id: task.id.clone(),
                    description: task.description.clone(),
                    kind,
                    tier: classification.tier,
                    minutes_left: classification.minutes_left,
                    delivered,
                    persisted,
                    at: now,
                });
            }
        }

        events.push(Event::TickCompleted {
            evaluated: tasks.len(),
            fired,
            at: now,
        });
        events
    }

    /// Start the periodic tick loop for `owner_id`.
    ///
    /// One pending tick at a time: a pass that overruns the interval delays
    /// the next tick instead of overlapping it. The returned handle cancels
    /// the loop; a tick already in flight completes, after which no further
    /// ticks or notifier calls occur.
    pub fn spawn(self: &Arc<Self>, owner_id: impl Into<String>) -> MonitorHandle {
        let monitor = Arc::clone(self);
        let owner_id = owner_id.into();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            info!(
                %owner_id,
                interval_secs = monitor.config.tick_interval.as_secs(),
                "deadline monitor started"
            );
            let mut ticker = tokio::time::interval(monitor.config.tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for event in monitor.evaluate(&owner_id) {
                            match event {
                                Event::AlertFired { task_id, kind, tier, .. } => {
                                    info!(%task_id, %kind, %tier, "alert fired");
                                }
                                Event::TickCompleted { evaluated, fired, .. } => {
                                    debug!(evaluated, fired, "tick completed");
                                }
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            info!("deadline monitor stopped");
        });

        MonitorHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Handle to a running monitor loop.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl MonitorHandle {
    /// Request cancellation. Returns immediately; an in-flight tick is
    /// allowed to complete.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait until the loop has exited.
    pub async fn stopped(self) {
        let _ = self.join.await;
    }
}
