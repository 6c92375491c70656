use std::collections::HashSet;
use std::num::NonZeroU64;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::args::PositiveU64;
use crate::error::{ProvisionError, ProvisionOp};

use super::{Provisioner, WorkUnitHandle, WorkUnitSpec};

/// Which attempts of an operation the simulated backend rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Never,
    Always,
    /// Fails attempts `n`, `2n`, `3n`, ... (1-based).
    EveryNth(NonZeroU64),
}

impl FailurePolicy {
    #[must_use]
    pub fn from_every(every: Option<PositiveU64>) -> Self {
        match every.map(PositiveU64::get) {
            None => FailurePolicy::Never,
            Some(1) => FailurePolicy::Always,
            Some(n) => NonZeroU64::new(n).map_or(FailurePolicy::Never, FailurePolicy::EveryNth),
        }
    }

    const fn fails(self, attempt: u64) -> bool {
        match self {
            FailurePolicy::Never => false,
            FailurePolicy::Always => true,
            FailurePolicy::EveryNth(n) => matches!(attempt.checked_rem(n.get()), Some(0)),
        }
    }
}

/// Counters of a [`SimulatedProvisioner`], read after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedStats {
    pub create_attempts: u64,
    pub delete_attempts: u64,
    pub created: u64,
    pub deleted: u64,
    pub live: usize,
}

/// In-process provisioner with fixed latency and injectable failures.
///
/// Live units are tracked by scope and name: creating a name twice fails with
/// [`ProvisionError::AlreadyExists`], deleting an unknown unit with
/// [`ProvisionError::NotFound`]. A failed delete leaves the unit live.
#[derive(Debug)]
pub struct SimulatedProvisioner {
    create_latency: Duration,
    delete_latency: Duration,
    create_failures: FailurePolicy,
    delete_failures: FailurePolicy,
    live: Mutex<HashSet<WorkUnitHandle>>,
    create_attempts: AtomicU64,
    delete_attempts: AtomicU64,
    created: AtomicU64,
    deleted: AtomicU64,
}

impl SimulatedProvisioner {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            create_latency: latency,
            delete_latency: latency,
            create_failures: FailurePolicy::Never,
            delete_failures: FailurePolicy::Never,
            live: Mutex::new(HashSet::new()),
            create_attempts: AtomicU64::new(0),
            delete_attempts: AtomicU64::new(0),
            created: AtomicU64::new(0),
            deleted: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn with_create_latency(mut self, latency: Duration) -> Self {
        self.create_latency = latency;
        self
    }

    #[must_use]
    pub const fn with_delete_latency(mut self, latency: Duration) -> Self {
        self.delete_latency = latency;
        self
    }

    #[must_use]
    pub const fn with_create_failures(mut self, policy: FailurePolicy) -> Self {
        self.create_failures = policy;
        self
    }

    #[must_use]
    pub const fn with_delete_failures(mut self, policy: FailurePolicy) -> Self {
        self.delete_failures = policy;
        self
    }

    #[must_use]
    pub fn stats(&self) -> SimulatedStats {
        SimulatedStats {
            create_attempts: self.create_attempts.load(Ordering::Relaxed),
            delete_attempts: self.delete_attempts.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            live: self.live.lock().map_or(0, |live| live.len()),
        }
    }
}

#[async_trait]
impl Provisioner for SimulatedProvisioner {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn create(&self, spec: &WorkUnitSpec) -> Result<WorkUnitHandle, ProvisionError> {
        let attempt = self
            .create_attempts
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1);
        if !self.create_latency.is_zero() {
            sleep(self.create_latency).await;
        }
        if self.create_failures.fails(attempt) {
            return Err(ProvisionError::Injected {
                op: ProvisionOp::Create,
                name: spec.name.clone(),
            });
        }

        let handle = WorkUnitHandle::for_spec(spec);
        let inserted = self
            .live
            .lock()
            .map_err(|_poisoned| ProvisionError::StatePoisoned)?
            .insert(handle.clone());
        if !inserted {
            return Err(ProvisionError::AlreadyExists {
                name: spec.name.clone(),
            });
        }
        self.created.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    async fn delete(&self, handle: &WorkUnitHandle) -> Result<(), ProvisionError> {
        let attempt = self
            .delete_attempts
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1);
        if !self.delete_latency.is_zero() {
            sleep(self.delete_latency).await;
        }
        if self.delete_failures.fails(attempt) {
            return Err(ProvisionError::Injected {
                op: ProvisionOp::Delete,
                name: handle.name.clone(),
            });
        }

        let removed = self
            .live
            .lock()
            .map_err(|_poisoned| ProvisionError::StatePoisoned)?
            .remove(handle);
        if !removed {
            return Err(ProvisionError::NotFound {
                name: handle.name.clone(),
            });
        }
        self.deleted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::WorkUnitTemplate;

    #[tokio::test(start_paused = true)]
    async fn create_then_delete_tracks_live_units() -> Result<(), String> {
        let provisioner = SimulatedProvisioner::new(Duration::from_millis(10));
        let template = WorkUnitTemplate::new("default");
        let spec = template.next_unit();

        let started = tokio::time::Instant::now();
        let handle = provisioner
            .create(&spec)
            .await
            .map_err(|err| err.to_string())?;
        if provisioner.stats().live != 1 {
            return Err("Expected one live unit".to_owned());
        }
        provisioner
            .delete(&handle)
            .await
            .map_err(|err| err.to_string())?;
        if started.elapsed() < Duration::from_millis(20) {
            return Err(format!("Unexpected elapsed: {:?}", started.elapsed()));
        }

        let stats = provisioner.stats();
        let expected = SimulatedStats {
            create_attempts: 1,
            delete_attempts: 1,
            created: 1,
            deleted: 1,
            live: 0,
        };
        if stats != expected {
            return Err(format!("Unexpected stats: {:?}", stats));
        }
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_create_and_unknown_delete_fail() -> Result<(), String> {
        let provisioner = SimulatedProvisioner::new(Duration::ZERO);
        let spec = WorkUnitTemplate::new("default").next_unit();

        provisioner
            .create(&spec)
            .await
            .map_err(|err| err.to_string())?;
        match provisioner.create(&spec).await {
            Err(ProvisionError::AlreadyExists { name }) if name == spec.name => {}
            other => return Err(format!("Expected AlreadyExists, got {:?}", other)),
        }

        let stranger = WorkUnitHandle {
            name: "work-pod-unknown".to_owned(),
            scope: "default".to_owned(),
        };
        match provisioner.delete(&stranger).await {
            Err(ProvisionError::NotFound { .. }) => Ok(()),
            other => Err(format!("Expected NotFound, got {:?}", other)),
        }
    }

    #[tokio::test]
    async fn failure_policy_every_nth_create() -> Result<(), String> {
        let provisioner = SimulatedProvisioner::new(Duration::ZERO)
            .with_create_failures(FailurePolicy::from_every(PositiveU64::try_from(3).ok()));
        let template = WorkUnitTemplate::new("default");

        let mut failures = Vec::new();
        for attempt in 1..=6_u64 {
            if provisioner.create(&template.next_unit()).await.is_err() {
                failures.push(attempt);
            }
        }
        if failures != [3, 6] {
            return Err(format!("Unexpected failing attempts: {:?}", failures));
        }
        Ok(())
    }

    #[tokio::test]
    async fn failed_delete_leaves_unit_live() -> Result<(), String> {
        let provisioner = SimulatedProvisioner::new(Duration::ZERO)
            .with_delete_failures(FailurePolicy::Always);
        let handle = provisioner
            .create(&WorkUnitTemplate::new("default").next_unit())
            .await
            .map_err(|err| err.to_string())?;
        match provisioner.delete(&handle).await {
            Err(ProvisionError::Injected {
                op: ProvisionOp::Delete,
                ..
            }) => {}
            other => return Err(format!("Expected injected delete failure, got {:?}", other)),
        }
        if provisioner.stats().live != 1 {
            return Err("Expected abandoned unit to stay live".to_owned());
        }
        Ok(())
    }

    #[test]
    fn failure_policy_from_every() -> Result<(), String> {
        if FailurePolicy::from_every(None) != FailurePolicy::Never {
            return Err("Expected Never".to_owned());
        }
        if FailurePolicy::from_every(PositiveU64::try_from(1).ok()) != FailurePolicy::Always {
            return Err("Expected Always".to_owned());
        }
        if FailurePolicy::Never.fails(1) || !FailurePolicy::Always.fails(1) {
            return Err("Unexpected fixed policy result".to_owned());
        }
        Ok(())
    }
}
