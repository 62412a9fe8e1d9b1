//! Deadline monitoring commands for CLI.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use taskmaster_core::{
    Config, ConsoleNotifier, DeadlineMonitor, Event, MonitorConfig, SystemClock, TaskDb,
};

#[derive(Subcommand)]
pub enum MonitorAction {
    /// Run the monitor loop until the process is stopped
    Run {
        /// Override the configured tick interval
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Stop after this many ticks (default: run forever)
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Run a single evaluation pass and exit
    Once {
        /// Print fired events as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: MonitorAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Arc::new(TaskDb::open()?);
    let config = Config::load()?;

    // A signed-out session short-circuits: nothing to monitor, not an error.
    let Some(owner) = db.session_owner()? else {
        println!("not signed in; nothing to monitor");
        return Ok(());
    };

    match action {
        MonitorAction::Run {
            interval_secs,
            ticks,
        } => {
            if !config.notifications.enabled {
                return Err("notifications are disabled (config notifications.enabled)".into());
            }
            let interval = interval_secs.unwrap_or(config.monitor.tick_interval_secs).max(1);
            let monitor = Arc::new(DeadlineMonitor::with_config(
                db,
                Arc::new(ConsoleNotifier),
                Arc::new(SystemClock),
                MonitorConfig {
                    tick_interval: Duration::from_secs(interval),
                },
            ));

            println!("Monitoring tasks for {owner} every {interval}s (Ctrl-C to stop)");
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async {
                let handle = monitor.spawn(owner);
                match ticks {
                    Some(n) => {
                        // The first tick is immediate, the rest are spaced
                        // one interval apart.
                        let run_for = Duration::from_secs(interval) * n.saturating_sub(1) as u32
                            + Duration::from_millis(500);
                        tokio::time::sleep(run_for).await;
                        handle.stop();
                        handle.stopped().await;
                    }
                    None => handle.stopped().await,
                }
            });
        }
        MonitorAction::Once { json } => {
            let monitor = DeadlineMonitor::new(db, Arc::new(ConsoleNotifier), Arc::new(SystemClock));
            let events = monitor.evaluate(&owner);
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                let fired = events.iter().filter(|e| e.is_alert()).count();
                match events.last() {
                    Some(Event::TickCompleted { evaluated, .. }) => {
                        println!("Evaluated {evaluated} task(s), fired {fired} alert(s)");
                    }
                    _ => println!("No tasks to evaluate"),
                }
            }
        }
    }
    Ok(())
}
