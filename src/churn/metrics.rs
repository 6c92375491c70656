use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Weight a full create+delete pair adds to the completed counter.
///
/// One create plus one delete, so `completed` is always even.
pub const OPERATIONS_PER_CYCLE: u64 = 2;

/// Per-round aggregate written concurrently by every worker.
///
/// Counters only ever grow. The round reads them once, through
/// [`RoundMetrics::into_counters`], after all workers have been joined.
#[derive(Debug, Default)]
pub struct RoundMetrics {
    completed: AtomicU64,
    total_latency_ms: AtomicU64,
    max_cycle_latency_ms: AtomicU64,
    create_failures: AtomicU64,
    delete_failures: AtomicU64,
}

impl RoundMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cycle that attempted both the create and the delete.
    pub fn record_cycle(&self, latency: Duration) {
        let latency_ms = duration_to_ms(latency);
        self.completed
            .fetch_add(OPERATIONS_PER_CYCLE, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
        self.max_cycle_latency_ms
            .fetch_max(latency_ms, Ordering::Relaxed);
    }

    pub fn record_create_failure(&self) {
        self.create_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete_failure(&self) {
        self.delete_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn into_counters(self) -> RoundCounters {
        RoundCounters {
            completed: self.completed.into_inner(),
            total_latency_ms: self.total_latency_ms.into_inner(),
            max_cycle_latency_ms: self.max_cycle_latency_ms.into_inner(),
            create_failures: self.create_failures.into_inner(),
            delete_failures: self.delete_failures.into_inner(),
        }
    }

    /// Reads the counters without consuming them.
    #[must_use]
    pub fn snapshot(&self) -> RoundCounters {
        RoundCounters {
            completed: self.completed.load(Ordering::Acquire),
            total_latency_ms: self.total_latency_ms.load(Ordering::Acquire),
            max_cycle_latency_ms: self.max_cycle_latency_ms.load(Ordering::Acquire),
            create_failures: self.create_failures.load(Ordering::Acquire),
            delete_failures: self.delete_failures.load(Ordering::Acquire),
        }
    }
}

/// Final, immutable counters of one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundCounters {
    pub completed: u64,
    pub total_latency_ms: u64,
    pub max_cycle_latency_ms: u64,
    pub create_failures: u64,
    pub delete_failures: u64,
}

impl RoundCounters {
    /// Number of create+delete pairs behind `completed`.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        match self.completed.checked_div(OPERATIONS_PER_CYCLE) {
            Some(cycles) => cycles,
            None => 0,
        }
    }

    #[must_use]
    pub const fn mean_cycle_latency_ms(&self) -> Option<u64> {
        self.total_latency_ms.checked_div(self.cycles())
    }

    /// Adds another round's counters, saturating; the maximum is kept.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            completed: self.completed.saturating_add(other.completed),
            total_latency_ms: self.total_latency_ms.saturating_add(other.total_latency_ms),
            max_cycle_latency_ms: if other.max_cycle_latency_ms > self.max_cycle_latency_ms {
                other.max_cycle_latency_ms
            } else {
                self.max_cycle_latency_ms
            },
            create_failures: self.create_failures.saturating_add(other.create_failures),
            delete_failures: self.delete_failures.saturating_add(other.delete_failures),
        }
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
