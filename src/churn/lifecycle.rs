use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::provision::{Provisioner, WorkUnitTemplate};
use crate::shutdown::ShutdownReceiver;

use super::{RoundCounters, RoundReport, RunConfig, run_round};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Pausing for the inter-round interval; the only state that reacts to
    /// shutdown.
    Waiting,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Signal,
    RoundLimit,
}

/// What a finished [`LifecycleController::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSummary {
    pub rounds: u64,
    pub stop_reason: StopReason,
    pub totals: RoundCounters,
    pub last_round: Option<RoundReport>,
    /// Time spent inside rounds, waits excluded.
    pub round_time: Duration,
    pub elapsed: Duration,
}

/// Drives rounds until a shutdown signal or the round limit.
pub struct LifecycleController {
    config: RunConfig,
    provisioner: Arc<dyn Provisioner>,
    template: Arc<WorkUnitTemplate>,
    state_tx: watch::Sender<LifecycleState>,
}

impl LifecycleController {
    #[must_use]
    pub fn new(
        config: RunConfig,
        provisioner: Arc<dyn Provisioner>,
        template: Arc<WorkUnitTemplate>,
    ) -> Self {
        let (state_tx, _) = watch::channel(LifecycleState::Waiting);
        Self {
            config,
            provisioner,
            template,
            state_tx,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state_tx.borrow()
    }

    /// Alternates between waiting out the interval and running a round.
    ///
    /// Shutdown is only observed while waiting: a signal that arrives during a
    /// round stays buffered in `shutdown_rx` and stops the controller at the
    /// next wait, after the round has been joined and reported. A closed or
    /// lagged shutdown channel counts as a signal.
    pub async fn run(&self, shutdown_rx: &mut ShutdownReceiver) -> LifecycleSummary {
        let started = Instant::now();
        let mut rounds: u64 = 0;
        let mut totals = RoundCounters::default();
        let mut last_round = None;
        let mut round_time = Duration::ZERO;

        let stop_reason = loop {
            self.set_state(LifecycleState::Waiting);
            let signalled = tokio::select! {
                biased;
                result = shutdown_rx.recv() => {
                    if let Err(err) = result {
                        debug!("Shutdown channel ended: {}", err);
                    }
                    true
                }
                () = sleep(self.config.interval) => false,
            };
            if signalled {
                info!("Shutdown requested, stopping after {} rounds", rounds);
                break StopReason::Signal;
            }

            self.set_state(LifecycleState::Running);
            let round = rounds.saturating_add(1);
            let report = run_round(&self.config, &self.provisioner, &self.template, round).await;
            info!("{}", report);

            rounds = round;
            totals = totals.merge(report.counters);
            round_time = round_time.saturating_add(report.elapsed);
            last_round = Some(report);

            if self.config.max_rounds.is_some_and(|max| rounds >= max) {
                info!("Round limit reached after {} rounds", rounds);
                break StopReason::RoundLimit;
            }
        };

        self.set_state(LifecycleState::Stopped);
        LifecycleSummary {
            rounds,
            stop_reason,
            totals,
            last_round,
            round_time,
            elapsed: started.elapsed(),
        }
    }

    fn set_state(&self, state: LifecycleState) {
        self.state_tx.send_modify(|current| *current = state);
    }
}
