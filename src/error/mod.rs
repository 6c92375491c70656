mod app;
mod config;
mod provision;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use provision::{ProvisionError, ProvisionOp};
pub use validation::ValidationError;
