use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{ChurnArgs, PositiveU64};
use crate::args::parsers::parse_namespace;
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue, KubeConfig, SimulatedConfig};

/// Applies configuration values to CLI arguments.
///
/// Values given on the command line always win over the config file.
///
/// # Errors
///
/// Returns an error when a config value is out of range or malformed.
pub fn apply_config(
    args: &mut ChurnArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "round_duration")
        && let Some(time) = config.time
    {
        args.round_duration = ensure_positive_u64(time, "time")?;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = concurrency;
    }

    if !is_cli(matches, "interval_ms")
        && let Some(interval) = config.interval
    {
        args.interval_ms = interval;
    }

    if !is_cli(matches, "cycle_delay")
        && let Some(delay) = config.cycle_delay.as_ref()
    {
        args.cycle_delay = Some(to_duration(delay, "cycle_delay")?);
    }

    if !is_cli(matches, "rounds")
        && let Some(rounds) = config.rounds
    {
        args.rounds = Some(ensure_positive_u64(rounds, "rounds")?);
    }

    if !is_cli(matches, "provisioner")
        && let Some(provisioner) = config.provisioner
    {
        args.provisioner = provisioner;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if let Some(kube) = config.kube.as_ref() {
        apply_kube_config(args, matches, kube)?;
    }
    if let Some(simulated) = config.simulated.as_ref() {
        apply_simulated_config(args, matches, simulated)?;
    }

    Ok(())
}

fn apply_kube_config(
    args: &mut ChurnArgs,
    matches: &ArgMatches,
    kube: &KubeConfig,
) -> AppResult<()> {
    if !is_cli(matches, "api_server")
        && let Some(api_server) = kube.api_server.clone()
    {
        args.api_server = Some(api_server);
    }

    if !is_cli(matches, "kubeconfig")
        && let Some(kubeconfig) = kube.kubeconfig.clone()
    {
        args.kubeconfig = Some(kubeconfig);
    }

    if !is_cli(matches, "context")
        && let Some(context) = kube.context.clone()
    {
        args.context = Some(context);
    }

    if !is_cli(matches, "namespace")
        && let Some(namespace) = kube.namespace.as_deref()
    {
        args.namespace = parse_namespace(namespace)?;
    }

    if !is_cli(matches, "token_file")
        && let Some(token_file) = kube.token_file.clone()
    {
        args.token_file = Some(token_file);
    }

    if !is_cli(matches, "cacert")
        && let Some(cacert) = kube.cacert.clone()
    {
        args.cacert = Some(cacert);
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = kube.insecure
    {
        args.insecure = insecure;
    }

    if !is_cli(matches, "image")
        && let Some(image) = kube.image.clone()
    {
        args.image = image;
    }

    if !is_cli(matches, "scheduler_name")
        && let Some(scheduler_name) = kube.scheduler_name.clone()
    {
        args.scheduler_name = scheduler_name;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = kube.request_timeout.as_ref()
    {
        args.request_timeout = to_duration(timeout, "kube.request_timeout")?;
    }

    Ok(())
}

fn apply_simulated_config(
    args: &mut ChurnArgs,
    matches: &ArgMatches,
    simulated: &SimulatedConfig,
) -> AppResult<()> {
    if !is_cli(matches, "sim_latency")
        && let Some(latency) = simulated.latency.as_ref()
    {
        args.sim_latency = to_duration(latency, "simulated.latency")?;
    }

    if !is_cli(matches, "sim_create_fail_every")
        && let Some(every) = simulated.create_fail_every
    {
        args.sim_create_fail_every = Some(ensure_positive_u64(
            every,
            "simulated.create_fail_every",
        )?);
    }

    if !is_cli(matches, "sim_delete_fail_every")
        && let Some(every) = simulated.delete_fail_every
    {
        args.sim_delete_fail_every = Some(ensure_positive_u64(
            every,
            "simulated.delete_fail_every",
        )?);
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}
