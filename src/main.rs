use clap::Parser;
use local_service::core::address::resolve_address;
use local_service::core::{JobSource, Registry};
use local_service::utils::{logger, validation::Validate};
use local_service::{
    BridgeConfig, BridgeError, CliConfig, ConsulRegistry, DryRunRegistry, JobSpecFile,
    LifecycleController, Orchestrator, ShutdownSignals,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.debug, cli.json_logs);

    let config = BridgeConfig::from(cli);
    tracing::info!("Starting local-service");
    tracing::debug!("Bridge config: {:?}", config);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "❌ local-service cannot continue");
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &BridgeConfig) -> Result<(), BridgeError> {
    config.validate()?;

    let registry: Box<dyn Registry> = if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be sent to Consul");
        Box::new(DryRunRegistry)
    } else {
        Box::new(ConsulRegistry::new(&config.registry)?)
    };

    let job = JobSpecFile::new(&config.jobspec).load()?;
    let address = resolve_address(config)?;
    tracing::info!(address = %address, "advertising services on this address");

    let mut signals = ShutdownSignals::install()?;

    let outcome = Orchestrator::new(registry.as_ref(), address).run(job).await;

    let mut controller = LifecycleController::new(outcome.teardown);
    controller
        .run_until(registry.as_ref(), signals.recv())
        .await;

    tracing::info!("✅ local-service stopped");
    Ok(())
}
