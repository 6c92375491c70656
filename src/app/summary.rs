use podchurn::churn::{LifecycleSummary, RunConfig, StopReason};
use podchurn::provision::SimulatedStats;

pub(crate) struct SummaryStats {
    pub(crate) ops_per_sec_x100: u64,
    pub(crate) cycles_per_sec_x100: u64,
}

/// Throughput over the time spent inside rounds, scaled by 100.
pub(crate) fn compute_summary_stats(summary: &LifecycleSummary) -> SummaryStats {
    let round_ms = summary.round_time.as_millis().max(1);
    let per_sec_x100 = |count: u64| {
        let scaled = u128::from(count)
            .saturating_mul(100_000)
            .checked_div(round_ms)
            .unwrap_or(0);
        u64::try_from(scaled).map_or(u64::MAX, |value| value)
    };
    SummaryStats {
        ops_per_sec_x100: per_sec_x100(summary.totals.completed),
        cycles_per_sec_x100: per_sec_x100(summary.totals.cycles()),
    }
}

pub(crate) fn summary_lines(
    summary: &LifecycleSummary,
    config: &RunConfig,
    provisioner: &str,
    simulated: Option<SimulatedStats>,
) -> Vec<String> {
    let stats = compute_summary_stats(summary);
    let totals = &summary.totals;

    let mut lines = Vec::new();
    lines.push("Summary:".to_owned());
    lines.push(format!("provisioner: {}", provisioner));
    lines.push(format!(
        "rounds: {} ({})",
        summary.rounds,
        stop_reason_label(summary.stop_reason)
    ));
    lines.push(format!("round_duration_s: {}", config.round_duration.as_secs()));
    lines.push(format!("concurrency: {}", config.concurrency));
    lines.push(format!("completed_ops: {}", totals.completed));
    lines.push(format!("cycles: {}", totals.cycles()));
    lines.push(format!("ops_per_sec: {}", format_x100(stats.ops_per_sec_x100)));
    lines.push(format!(
        "cycles_per_sec: {}",
        format_x100(stats.cycles_per_sec_x100)
    ));
    lines.push(format!("total_latency_ms: {}", totals.total_latency_ms));
    lines.push(format!(
        "mean_cycle_latency_ms: {}",
        totals
            .mean_cycle_latency_ms()
            .map_or_else(|| "n/a".to_owned(), |mean| mean.to_string())
    ));
    lines.push(format!("max_cycle_latency_ms: {}", totals.max_cycle_latency_ms));
    lines.push(format!("create_failures: {}", totals.create_failures));
    lines.push(format!("delete_failures: {}", totals.delete_failures));
    if let Some(simulated) = simulated {
        lines.push(format!("abandoned_units: {}", simulated.live));
    }
    lines.push(format!("elapsed: {:.2?}", summary.elapsed));
    lines
}

pub(crate) fn print_summary(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

const fn stop_reason_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::Signal => "stopped by signal",
        StopReason::RoundLimit => "round limit reached",
    }
}

fn format_x100(value: u64) -> String {
    let whole = value.checked_div(100).unwrap_or(0);
    let frac = value.checked_rem(100).unwrap_or(0);
    format!("{}.{:02}", whole, frac)
}
