//! Core library for the `podchurn` CLI.
//!
//! `podchurn` stresses a resource-management API by creating and deleting
//! short-lived work units (Kubernetes pods by default) from many concurrent
//! workers, in timed rounds, until it is signalled to stop. This crate holds
//! the engine and its collaborators: CLI argument types, configuration
//! files, provisioner backends, and the round/lifecycle machinery. The
//! primary user-facing interface is the `podchurn` binary.
pub mod args;
pub mod churn;
pub mod config;
pub mod error;
pub mod provision;
pub mod shutdown;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
