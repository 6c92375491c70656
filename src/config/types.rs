use std::time::Duration;

use serde::Deserialize;

use crate::args::ProvisionerKind;
use crate::args::parsers::parse_duration;
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Round duration in seconds.
    #[serde(alias = "duration")]
    pub time: Option<u64>,
    pub concurrency: Option<usize>,
    /// Inter-round pause in milliseconds.
    pub interval: Option<u64>,
    pub cycle_delay: Option<DurationValue>,
    pub rounds: Option<u64>,
    pub provisioner: Option<ProvisionerKind>,
    pub kube: Option<KubeConfig>,
    pub simulated: Option<SimulatedConfig>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KubeConfig {
    pub api_server: Option<String>,
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    pub namespace: Option<String>,
    pub token_file: Option<String>,
    pub cacert: Option<String>,
    pub insecure: Option<bool>,
    pub image: Option<String>,
    pub scheduler_name: Option<String>,
    pub request_timeout: Option<DurationValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulatedConfig {
    pub latency: Option<DurationValue>,
    pub create_fail_every: Option<u64>,
    pub delete_fail_every: Option<u64>,
}

/// Either whole seconds or a suffixed string such as `"250ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}
