use std::sync::Arc;

use tracing::{error, info, warn};

use podchurn::args::{ChurnArgs, ProvisionerKind};
use podchurn::churn::{LifecycleController, RunConfig};
use podchurn::error::AppResult;
use podchurn::provision::{
    FailurePolicy, KubeProvisioner, KubeSettings, Provisioner, SimulatedProvisioner,
    WorkUnitTemplate,
};
use podchurn::shutdown::shutdown_channel;

use super::summary::{print_summary, summary_lines};
use crate::shutdown_handlers::setup_signal_shutdown_handler;

struct Backend {
    shared: Arc<dyn Provisioner>,
    simulated: Option<Arc<SimulatedProvisioner>>,
}

pub(crate) async fn run(args: &ChurnArgs) -> AppResult<()> {
    let config = RunConfig::from_args(args);
    let backend = build_backend(args).await?;
    let provisioner_name = backend.shared.name();

    info!(
        "Churning with the {} provisioner in namespace {}: {} workers, {}s rounds, {}ms interval",
        provisioner_name,
        args.namespace,
        config.concurrency,
        config.round_duration.as_secs(),
        config.interval.as_millis()
    );
    if config.concurrency == 0 {
        warn!("Concurrency is 0, rounds will complete without work.");
    }

    let template = Arc::new(WorkUnitTemplate::new(args.namespace.clone()));
    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let controller = LifecycleController::new(config, Arc::clone(&backend.shared), template);
    let summary = controller.run(&mut shutdown_rx).await;

    drop(shutdown_tx.send(()));
    signal_handle.await?;

    let simulated_stats = backend.simulated.as_ref().map(|simulated| simulated.stats());
    print_summary(&summary_lines(
        &summary,
        &config,
        provisioner_name,
        simulated_stats,
    ));
    Ok(())
}

async fn build_backend(args: &ChurnArgs) -> AppResult<Backend> {
    match args.provisioner {
        ProvisionerKind::Kube => {
            let settings = KubeSettings::from_args(args)?;
            info!("Using API server {}", settings.api_server);
            let kube = KubeProvisioner::new(settings, &args.namespace)?;
            if let Err(err) = kube.preflight().await {
                error!("API server preflight failed: {}", err);
                return Err(err.into());
            }
            Ok(Backend {
                shared: Arc::new(kube),
                simulated: None,
            })
        }
        ProvisionerKind::Simulated => {
            let simulated = Arc::new(
                SimulatedProvisioner::new(args.sim_latency)
                    .with_create_failures(FailurePolicy::from_every(args.sim_create_fail_every))
                    .with_delete_failures(FailurePolicy::from_every(args.sim_delete_fail_every)),
            );
            Ok(Backend {
                shared: Arc::clone(&simulated) as Arc<dyn Provisioner>,
                simulated: Some(simulated),
            })
        }
    }
}
