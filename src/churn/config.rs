use std::time::Duration;

use crate::args::{ChurnArgs, PositiveU64};

/// Immutable engine settings, built once from the parsed arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub round_duration: Duration,
    pub concurrency: usize,
    /// Pause before every round, including the first.
    pub interval: Duration,
    /// Optional pause between two cycles of one worker.
    pub cycle_delay: Option<Duration>,
    /// Stop after this many rounds; `None` runs until signalled.
    pub max_rounds: Option<u64>,
}

impl RunConfig {
    #[must_use]
    pub fn from_args(args: &ChurnArgs) -> Self {
        Self {
            round_duration: Duration::from_secs(args.round_duration.get()),
            concurrency: args.concurrency,
            interval: Duration::from_millis(args.interval_ms),
            cycle_delay: args.cycle_delay,
            max_rounds: args.rounds.map(PositiveU64::get),
        }
    }
}
