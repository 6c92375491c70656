//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(any(test, feature = "fuzzing"))]
pub(crate) mod test_support;

pub use cli::ChurnArgs;
pub use types::{PositiveU64, ProvisionerKind};

pub(crate) use defaults::{
    DEFAULT_CONFIG_FILES, DEFAULT_IMAGE, DEFAULT_NAMESPACE, DEFAULT_SCHEDULER_NAME,
    DEFAULT_USER_AGENT,
};
