use clap::Parser;
use std::time::Duration;

use super::defaults::{DEFAULT_IMAGE, DEFAULT_NAMESPACE, DEFAULT_SCHEDULER_NAME};
use super::parsers::{parse_bool_env, parse_duration_arg, parse_namespace, parse_positive_u64};
use super::types::{PositiveU64, ProvisionerKind};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Round-based pod churn generator - creates and deletes short-lived pods under fixed concurrency and reports throughput and latency per round."
)]
pub struct ChurnArgs {
    /// Duration of each round (seconds)
    #[arg(
        long = "time",
        short = 't',
        alias = "duration",
        default_value = "10",
        value_parser = parse_positive_u64
    )]
    pub round_duration: PositiveU64,

    /// Workers per round (0 runs empty rounds)
    #[arg(long, short = 'c', default_value = "10")]
    pub concurrency: usize,

    /// Pause between rounds (milliseconds)
    #[arg(long = "interval", short = 'i', default_value = "10")]
    pub interval_ms: u64,

    /// Fixed pause between cycles inside a worker (supports ms/s/m/h)
    #[arg(long = "cycle-delay", value_parser = parse_duration_arg)]
    pub cycle_delay: Option<Duration>,

    /// Stop after N rounds (default: run until SIGINT/SIGTERM)
    #[arg(long = "rounds", value_parser = parse_positive_u64)]
    pub rounds: Option<PositiveU64>,

    /// Backend to churn against
    #[arg(long, value_enum, default_value = "kube", ignore_case = true)]
    pub provisioner: ProvisionerKind,

    /// Kubernetes API server URL (defaults to the kubeconfig cluster, then the in-cluster service address)
    #[arg(long = "api-server", env = "PODCHURN_API_SERVER")]
    pub api_server: Option<String>,

    /// Kubeconfig file (defaults to $KUBECONFIG, then ~/.kube/config)
    #[arg(long = "kubeconfig")]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long = "context")]
    pub context: Option<String>,

    /// Namespace the work pods are created in
    #[arg(long, short = 'n', default_value = DEFAULT_NAMESPACE, value_parser = parse_namespace)]
    pub namespace: String,

    /// Bearer token file (overrides kubeconfig credentials and the in-cluster service account token)
    #[arg(long = "token-file", env = "PODCHURN_TOKEN_FILE")]
    pub token_file: Option<String>,

    /// PEM bundle used to verify the API server certificate
    #[arg(long = "cacert")]
    pub cacert: Option<String>,

    /// Skip TLS verification of the API server
    #[arg(long = "insecure")]
    pub insecure: bool,

    /// Container image of the work pod
    #[arg(long, default_value = DEFAULT_IMAGE)]
    pub image: String,

    /// Scheduler name set on the work pod
    #[arg(long = "scheduler-name", default_value = DEFAULT_SCHEDULER_NAME)]
    pub scheduler_name: String,

    /// Timeout for a single API request (supports ms/s/m/h)
    #[arg(
        long = "request-timeout",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Latency of each simulated create/delete (supports ms/s/m/h)
    #[arg(
        long = "sim-latency",
        default_value = "5ms",
        value_parser = parse_duration_arg
    )]
    pub sim_latency: Duration,

    /// Fail every Nth simulated create
    #[arg(long = "sim-create-fail-every", value_parser = parse_positive_u64)]
    pub sim_create_fail_every: Option<PositiveU64>,

    /// Fail every Nth simulated delete
    #[arg(long = "sim-delete-fail-every", value_parser = parse_positive_u64)]
    pub sim_delete_fail_every: Option<PositiveU64>,

    /// Path to config file (TOML/JSON). Defaults to ./podchurn.toml or ./podchurn.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by PODCHURN_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
