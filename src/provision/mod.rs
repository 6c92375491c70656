//! Resource provisioners the churn engine drives.
//!
//! The engine only needs two operations, create one unit and delete it again,
//! so every backend is reduced to the [`Provisioner`] trait. Backends are
//! shared between workers as `Arc<dyn Provisioner>` and must be reentrant.
mod kube;
mod simulated;
mod unit;

use async_trait::async_trait;

use crate::error::ProvisionError;

pub use kube::{ClientIdentity, KubeProvisioner, KubeSettings, PemSource};
pub use simulated::{FailurePolicy, SimulatedProvisioner, SimulatedStats};
pub use unit::{WORK_UNIT_LABEL, WORK_UNIT_PREFIX, WorkUnitHandle, WorkUnitSpec, WorkUnitTemplate};

#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Short backend name used in log lines.
    fn name(&self) -> &'static str;

    /// Checks once, before any round, that the backend is usable.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be reached or rejects the
    /// configured credentials.
    async fn preflight(&self) -> Result<(), ProvisionError> {
        Ok(())
    }

    /// Creates one work unit.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend refuses or fails the create.
    async fn create(&self, spec: &WorkUnitSpec) -> Result<WorkUnitHandle, ProvisionError>;

    /// Deletes a work unit previously returned by [`Provisioner::create`].
    ///
    /// # Errors
    ///
    /// Returns an error when the backend refuses or fails the delete.
    async fn delete(&self, handle: &WorkUnitHandle) -> Result<(), ProvisionError>;
}
