//! Round-based churn engine.
//!
//! A [`LifecycleController`] alternates between waiting out the inter-round
//! interval and running rounds. Each round fans out to `concurrency` workers
//! that create and delete work units until a shared deadline expires, while
//! recording into lock-free [`RoundMetrics`].
mod config;
mod lifecycle;
mod metrics;
mod round;
mod worker;


pub use config::RunConfig;
pub use lifecycle::{LifecycleController, LifecycleState, LifecycleSummary, StopReason};
pub use metrics::{OPERATIONS_PER_CYCLE, RoundCounters, RoundMetrics};
pub use round::{RoundReport, run_round};
pub use worker::{RoundDeadline, Worker, WorkerExit};
