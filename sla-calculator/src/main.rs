use anyhow::Context;
use oncall_adapters::sage::{SageClient, SageConfig};
use oncall_config::{ProcessEnv, SlaCalculatorConfig};
use oncall_telemetry::{LogTarget, MetricsServer, Registry, SlaMetrics, init_tracing, shutdown_signal};
use sla_calculator::{IndicatorQueries, SlaCalculator, SlaTargets, SqliteIndicatorStore};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env = ProcessEnv::with_dotenv();
    let config = SlaCalculatorConfig::from_env(&env).context("invalid sla calculator configuration")?;
    init_tracing(config.log_level, LogTarget::Stdout)?;
    info!(?config, "starting sla calculator");

    let registry = Registry::new();
    let metrics = SlaMetrics::register(&registry)?;
    let (addr, _server) = MetricsServer::new(config.metrics_port, registry).spawn()?;
    info!(%addr, "metrics endpoint listening");

    let store = SqliteIndicatorStore::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let backend = SageClient::new(
        SageConfig::new(&config.sage_url, config.sage_token.clone())?
            .with_timeout(config.request_timeout),
    )?;
    let targets = SlaTargets {
        success_percent: config.success_percent_slo,
        p98_duration_millis: config.p98_duration_millis_slo,
    };
    let calculator = SlaCalculator::new(
        backend,
        store,
        IndicatorQueries::new(&config.selector),
        targets,
        metrics,
    );

    tokio::select! {
        () = calculator.run(config.scrape_interval) => {}
        () = shutdown_signal() => println!("Terminating"),
    }
    Ok(())
}
