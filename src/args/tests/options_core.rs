use super::*;

#[test]
fn parse_args_reference_flags() -> AppResult<()> {
    let args = parse_test_args([
        "podchurn",
        "--time",
        "3",
        "--concurrency",
        "25",
        "--interval",
        "250",
    ])?;
    if args.round_duration.get() != 3 {
        return Err(AppError::validation("Unexpected round_duration"));
    }
    if args.concurrency != 25 {
        return Err(AppError::validation("Unexpected concurrency"));
    }
    if args.interval_ms != 250 {
        return Err(AppError::validation("Unexpected interval_ms"));
    }
    Ok(())
}

#[test]
fn parse_args_short_flags_and_duration_alias() -> AppResult<()> {
    let args = parse_test_args(["podchurn", "--duration", "7", "-c", "2", "-i", "5"])?;
    if args.round_duration.get() != 7 {
        return Err(AppError::validation("Unexpected round_duration"));
    }
    if args.concurrency != 2 || args.interval_ms != 5 {
        return Err(AppError::validation("Unexpected concurrency/interval"));
    }
    Ok(())
}

#[test]
fn parse_args_accepts_zero_concurrency() -> AppResult<()> {
    let args = parse_test_args(["podchurn", "-c", "0"])?;
    if args.concurrency != 0 {
        return Err(AppError::validation("Expected zero concurrency"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_round_duration() -> AppResult<()> {
    if parse_test_args(["podchurn", "-t", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero duration to be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_simulated_provisioner() -> AppResult<()> {
    let args = parse_test_args([
        "podchurn",
        "--provisioner",
        "sim",
        "--sim-latency",
        "50ms",
        "--sim-create-fail-every",
        "3",
        "--sim-delete-fail-every",
        "1",
        "--rounds",
        "2",
        "--cycle-delay",
        "20ms",
    ])?;
    if !matches!(args.provisioner, ProvisionerKind::Simulated) {
        return Err(AppError::validation("Expected ProvisionerKind::Simulated"));
    }
    if args.sim_latency != Duration::from_millis(50) {
        return Err(AppError::validation("Unexpected sim_latency"));
    }
    if args.sim_create_fail_every.map(PositiveU64::get) != Some(3) {
        return Err(AppError::validation("Unexpected sim_create_fail_every"));
    }
    if args.sim_delete_fail_every.map(PositiveU64::get) != Some(1) {
        return Err(AppError::validation("Unexpected sim_delete_fail_every"));
    }
    if args.rounds.map(PositiveU64::get) != Some(2) {
        return Err(AppError::validation("Unexpected rounds"));
    }
    if args.cycle_delay != Some(Duration::from_millis(20)) {
        return Err(AppError::validation("Unexpected cycle_delay"));
    }
    Ok(())
}

#[test]
fn parse_args_kube_connection_options() -> AppResult<()> {
    let args = parse_test_args([
        "podchurn",
        "--api-server",
        "https://10.0.0.1:6443",
        "-n",
        "churn",
        "--token-file",
        "/tmp/token",
        "--cacert",
        "/tmp/ca.pem",
        "--insecure",
        "--request-timeout",
        "2s",
    ])?;
    if args.api_server.as_deref() != Some("https://10.0.0.1:6443") {
        return Err(AppError::validation("Unexpected api_server"));
    }
    if args.namespace != "churn" {
        return Err(AppError::validation("Unexpected namespace"));
    }
    if args.token_file.as_deref() != Some("/tmp/token") {
        return Err(AppError::validation("Unexpected token_file"));
    }
    if args.cacert.as_deref() != Some("/tmp/ca.pem") {
        return Err(AppError::validation("Unexpected cacert"));
    }
    if !args.insecure {
        return Err(AppError::validation("Expected insecure"));
    }
    if args.request_timeout != Duration::from_secs(2) {
        return Err(AppError::validation("Unexpected request_timeout"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_blank_namespace() -> AppResult<()> {
    if parse_test_args(["podchurn", "--namespace", "  "]).is_ok() {
        return Err(AppError::validation("Expected blank namespace to be rejected"));
    }
    Ok(())
}
