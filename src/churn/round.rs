use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error};

use crate::provision::{Provisioner, WorkUnitTemplate};

use super::{RoundCounters, RoundDeadline, RoundMetrics, RunConfig, Worker, WorkerExit};

/// Immutable outcome of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: u64,
    pub elapsed: Duration,
    pub concurrency: usize,
    pub counters: RoundCounters,
    pub workers_deadline_reached: usize,
    pub workers_create_failed: usize,
    /// Worker tasks that panicked or were cancelled instead of returning.
    pub workers_aborted: usize,
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Round {}: {} ops ({} cycles) by {} workers in {:.2?}, total latency {}ms",
            self.round,
            self.counters.completed,
            self.counters.cycles(),
            self.concurrency,
            self.elapsed,
            self.counters.total_latency_ms,
        )?;
        if let Some(mean) = self.counters.mean_cycle_latency_ms() {
            write!(
                f,
                ", mean {}ms, max {}ms",
                mean, self.counters.max_cycle_latency_ms
            )?;
        }
        write!(
            f,
            ", {} create failures, {} delete failures",
            self.counters.create_failures, self.counters.delete_failures
        )
    }
}

/// Runs one round: `concurrency` workers churn until a shared deadline.
///
/// Every worker is joined before the metrics are read; there is no path that
/// reports a partially joined round. A failed or panicking worker only ends
/// itself.
pub async fn run_round(
    config: &RunConfig,
    provisioner: &Arc<dyn Provisioner>,
    template: &Arc<WorkUnitTemplate>,
    round: u64,
) -> RoundReport {
    let started = Instant::now();
    let deadline = RoundDeadline::after(config.round_duration);
    let metrics = Arc::new(RoundMetrics::new());

    let mut handles = Vec::with_capacity(config.concurrency);
    for id in 0..config.concurrency {
        let worker = Worker {
            id,
            deadline,
            cycle_delay: config.cycle_delay,
            provisioner: Arc::clone(provisioner),
            template: Arc::clone(template),
            metrics: Arc::clone(&metrics),
        };
        handles.push(tokio::spawn(worker.run()));
    }
    debug!("Round {} started {} workers", round, handles.len());

    let mut workers_deadline_reached: usize = 0;
    let mut workers_create_failed: usize = 0;
    let mut workers_aborted: usize = 0;
    for handle in handles {
        match handle.await {
            Ok(WorkerExit::DeadlineReached) => {
                workers_deadline_reached = workers_deadline_reached.saturating_add(1);
            }
            Ok(WorkerExit::CreateFailed) => {
                workers_create_failed = workers_create_failed.saturating_add(1);
            }
            Err(err) => {
                error!("Round {} worker task failed: {}", round, err);
                workers_aborted = workers_aborted.saturating_add(1);
            }
        }
    }

    let counters = Arc::try_unwrap(metrics)
        .map_or_else(|shared| shared.snapshot(), RoundMetrics::into_counters);

    RoundReport {
        round,
        elapsed: started.elapsed(),
        concurrency: config.concurrency,
        counters,
        workers_deadline_reached,
        workers_create_failed,
        workers_aborted,
    }
}
