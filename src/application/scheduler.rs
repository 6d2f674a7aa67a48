use chrono::{DateTime, Local};
use std::future::Future;
use std::time::Duration;
use tracing::info;

use super::monitor::Monitor;
use crate::report::CycleReport;

/// Runs a check cycle on startup, then again `interval` after each cycle ends.
pub struct Scheduler {
    interval: Duration,
    next_check: Option<DateTime<Local>>,
    cycles_run: u64,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_check: None,
            cycles_run: 0,
        }
    }

    pub fn next_check(&self) -> Option<DateTime<Local>> {
        self.next_check
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Run cycles until `shutdown` resolves. A cycle in flight when shutdown
    /// arrives is abandoned.
    pub async fn run<F>(&mut self, monitor: &Monitor, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("⏰ Scheduler started; checking every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.run_once(monitor) => {}
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("🛑 Scheduler stopped after {} cycles", self.cycles_run);
    }

    /// Run a single cycle and compute the next check time from its completion.
    pub async fn run_once(&mut self, monitor: &Monitor) -> CycleReport {
        let report = monitor.run_cycle().await;
        self.cycles_run += 1;

        let next = chrono::Duration::from_std(self.interval)
            .ok()
            .and_then(|d| Local::now().checked_add_signed(d));
        self.next_check = next;
        if let Some(next) = next {
            info!("Next check at {}", next.format("%Y-%m-%d %H:%M:%S"));
        }
        report
    }
}
