//! Check scheduler.
//!
//! Drives the [`CycleRunner`] on a fixed cadence: each tick runs one full
//! check cycle to completion before the next tick is considered. Cycles
//! never overlap, and a cycle that overruns the interval delays the next
//! tick instead of queueing extra ones.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::monitor::{CycleReport, CycleRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

pub struct Scheduler {
    interval: Duration,
    runner: CycleRunner,
    state: SchedulerState,
    cycles_run: u64,
}

impl Scheduler {
    pub fn new(runner: CycleRunner, interval: Duration) -> Self {
        Self {
            interval,
            runner,
            state: SchedulerState::Idle,
            cycles_run: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Run a single cycle immediately, outside the tick loop.
    pub async fn run_once(&mut self) -> CycleReport {
        let report = self.runner.run_cycle().await;
        self.cycles_run += 1;
        report
    }

    /// Run the polling loop until `shutdown` resolves.
    ///
    /// The first cycle runs one interval after start. Shutdown is only
    /// observed between cycles: an in-flight cycle always finishes, and a
    /// pending shutdown wins over a pending tick.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        self.state = SchedulerState::Running;
        tracing::info!(
            "Scheduler started (interval: {}s, targets: {}). Press Ctrl+C to stop.",
            self.interval.as_secs(),
            self.runner.targets().len()
        );

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received. Stopping scheduler.");
                    break;
                }

                _ = ticker.tick() => {
                    let report = self.run_once().await;
                    tracing::debug!(
                        "Cycle finished at {}: {} checked, {} down",
                        report.timestamp,
                        report.checked,
                        report.down_entries.len()
                    );
                }
            }
        }

        self.state = SchedulerState::Stopped;
        tracing::info!("Scheduler stopped after {} cycles", self.cycles_run);
    }
}
