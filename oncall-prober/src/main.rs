use anyhow::Context;
use oncall_adapters::oncall::{OncallClient, OncallConfig};
use oncall_adapters::traits::{Credentials, TeamDescriptor};
use oncall_config::{ProberConfig, ProcessEnv};
use oncall_prober::{LoginPolicy, Prober};
use oncall_telemetry::{
    LogTarget, MetricsServer, ProberMetrics, Registry, init_tracing, shutdown_signal,
};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env = ProcessEnv::with_dotenv();
    let config = ProberConfig::from_env(&env).context("invalid prober configuration")?;
    init_tracing(config.log_level, LogTarget::Stdout)?;
    info!(?config, "starting oncall prober");

    let registry = Registry::new();
    let metrics = ProberMetrics::register(&registry)?;
    let (addr, _server) = MetricsServer::new(config.metrics_port, registry).spawn()?;
    info!(%addr, "metrics endpoint listening");

    let oncall = OncallConfig::new(&config.oncall_url)?.with_timeout(config.request_timeout);
    info!(base_url = oncall.base_url(), "using oncall API");
    let client = OncallClient::new(oncall)?;
    let credentials = Credentials::new(config.username.clone(), config.password.clone())?;
    let policy = LoginPolicy::new(config.login_max_attempts, config.login_retry_delay);
    let team = TeamDescriptor::probe(config.team_name.clone());

    let mut prober = Prober::new(client, credentials, policy, team, metrics);

    tokio::select! {
        result = prober.run(config.scrape_interval) => result?,
        () = shutdown_signal() => println!("Terminating"),
    }
    Ok(())
}
