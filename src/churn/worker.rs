use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{error, info, warn};

use crate::provision::{Provisioner, WorkUnitTemplate};

use super::RoundMetrics;

/// Thirty years; longer round durations are clamped to it.
const FAR_FUTURE: Duration = Duration::from_secs(946_080_000);

/// Monotonic end of a round, shared by all of its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundDeadline {
    at: Instant,
}

impl RoundDeadline {
    /// A deadline `duration` from now, at most thirty years away.
    #[must_use]
    pub fn after(duration: Duration) -> Self {
        let now = Instant::now();
        Self {
            at: now.checked_add(duration.min(FAR_FUTURE)).unwrap_or(now),
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    DeadlineReached,
    CreateFailed,
}

/// One churn loop of a round.
pub struct Worker {
    pub id: usize,
    pub deadline: RoundDeadline,
    pub cycle_delay: Option<Duration>,
    pub provisioner: Arc<dyn Provisioner>,
    pub template: Arc<WorkUnitTemplate>,
    pub metrics: Arc<RoundMetrics>,
}

impl Worker {
    /// Creates and deletes units until the deadline expires or a create fails.
    ///
    /// The deadline is only checked before a cycle starts, so a worker can
    /// overrun it by one in-flight cycle. A failed delete abandons the unit and
    /// the loop goes on; a failed create ends the worker.
    pub async fn run(self) -> WorkerExit {
        let mut cycles: u64 = 0;
        loop {
            if self.deadline.is_expired() {
                info!(
                    "Worker {} done after {} cycles, round deadline reached",
                    self.id, cycles
                );
                return WorkerExit::DeadlineReached;
            }

            let spec = self.template.next_unit();
            let started = Instant::now();
            let handle = match self.provisioner.create(&spec).await {
                Ok(handle) => handle,
                Err(err) => {
                    self.metrics.record_create_failure();
                    error!("Worker {} failed to create {}: {}", self.id, spec.name, err);
                    info!(
                        "Worker {} done after {} cycles, stopping on create failure",
                        self.id, cycles
                    );
                    return WorkerExit::CreateFailed;
                }
            };

            if let Err(err) = self.provisioner.delete(&handle).await {
                self.metrics.record_delete_failure();
                warn!(
                    "Worker {} failed to delete {}: {}",
                    self.id, handle.name, err
                );
            }

            let latency = started.elapsed();
            self.metrics.record_cycle(latency);
            cycles = cycles.saturating_add(1);
            info!(
                "Worker {} cycle {} for {} took {:?}",
                self.id, cycles, handle.name, latency
            );

            if let Some(delay) = self.cycle_delay {
                sleep(delay).await;
            }
        }
    }
}
