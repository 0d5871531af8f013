//! The outer polling loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::client::{HomeworkApi, Notifier};
use crate::cycle::{CycleOutcome, PollCycle};

/// Default wait between two cycles.
pub const RETRY_PERIOD: Duration = Duration::from_secs(600);

/// Runs a [`PollCycle`] forever at a fixed period.
///
/// The wait after each cycle is unconditional and is the only point where
/// shutdown is observed: a cycle that has started always runs to its end.
pub struct Scheduler<A, N> {
    cycle: PollCycle<A, N>,
    period: Duration,
}

impl<A: HomeworkApi, N: Notifier> Scheduler<A, N> {
    /// Creates a scheduler that waits `period` between cycles.
    pub const fn new(cycle: PollCycle<A, N>, period: Duration) -> Self {
        Self { cycle, period }
    }

    /// Returns the wrapped poll cycle.
    pub const fn cycle(&self) -> &PollCycle<A, N> {
        &self.cycle
    }

    /// Runs cycles until `shutdown` resolves, returning how many ran.
    pub async fn run_until<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0u64;

        loop {
            let outcome = self.cycle.run().await;
            cycles += 1;
            match &outcome {
                CycleOutcome::Unchanged => debug!(cycle = cycles, "No status change"),
                CycleOutcome::Delivered(_) => info!(cycle = cycles, "Status update delivered"),
                CycleOutcome::Failed { failure, reported } => {
                    debug!(cycle = cycles, kind = %failure.kind(), reported, "Cycle failed");
                }
            }

            tokio::select! {
                () = &mut shutdown => {
                    info!(cycles, "Shutdown requested, stopping poller");
                    return cycles;
                }
                () = sleep(self.period) => {}
            }
        }
    }
}
