use anyhow::Context;
use log_reformatter::{LineParser, LogTail, ReformatError, Reformatter, ServiceTags, write_record};
use oncall_config::{ProcessEnv, ReformatterConfig};
use oncall_telemetry::{
    LogTarget, MetricsServer, Registry, ReformatterMetrics, init_tracing, shutdown_signal,
};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env = ProcessEnv::with_dotenv();
    let config = ReformatterConfig::from_env(&env).context("invalid reformatter configuration")?;
    // stdout carries the records, so diagnostics go to stderr.
    init_tracing(config.log_level, LogTarget::Stderr)?;
    info!(?config, "starting log reformatter");

    let parser = LineParser::new(ServiceTags {
        service: config.service.clone(),
        environment: config.environment.clone(),
        group: config.group.clone(),
    })?;
    let mut stdout = tokio::io::stdout();

    let tail = match LogTail::open(&config.log_file, config.poll_interval).await {
        Ok(tail) => tail,
        Err(err) => {
            if let ReformatError::MissingFile { path } = &err {
                write_record(&mut stdout, &parser.missing_file(path)).await?;
            }
            error!(error = %err, "cannot follow log file");
            return Err(err.into());
        }
    };
    info!(path = %tail.path().display(), "following log file");

    let registry = Registry::new();
    let metrics = ReformatterMetrics::register(&registry)?;
    let (addr, _server) = MetricsServer::new(config.metrics_port, registry).spawn()?;
    info!(%addr, "metrics endpoint listening");

    let mut reformatter = Reformatter::new(tail, parser, metrics);
    tokio::select! {
        result = reformatter.run(&mut stdout) => result?,
        () = shutdown_signal() => eprintln!("Terminating"),
    }
    Ok(())
}
