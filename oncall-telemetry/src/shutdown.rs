//! Process termination signals.

use tracing::warn;

/// Resolves once the process receives SIGTERM or SIGINT (Ctrl-C elsewhere).
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
                return;
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "failed to register unix signal handlers, falling back to ctrl-c");
            }
        }
    }

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
