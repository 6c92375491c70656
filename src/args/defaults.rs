pub(crate) const DEFAULT_USER_AGENT: &str = concat!("podchurn/", env!("CARGO_PKG_VERSION"));

/// Config filenames checked when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["podchurn.toml", "podchurn.json"];

pub(crate) const DEFAULT_NAMESPACE: &str = "default";
pub(crate) const DEFAULT_IMAGE: &str = "alpine:3.3";
/// No scheduler answers to this name, so churned pods stay `Pending` and never pull an image.
pub(crate) const DEFAULT_SCHEDULER_NAME: &str = "mock";
