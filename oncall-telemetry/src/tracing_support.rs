//! Structured tracing setup.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::{TelemetryError, TelemetryResult};

/// Stream diagnostics are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// Standard error, for processes whose stdout carries data.
    Stderr,
}

/// Installs the global `fmt` subscriber.
///
/// `level` is the default directive; `RUST_LOG` overrides it when set.
///
/// # Errors
///
/// Returns [`TelemetryError::Tracing`] if a global subscriber is already set.
pub fn init_tracing(level: Level, target: LogTarget) -> TelemetryResult<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match target {
        LogTarget::Stdout => builder.with_writer(std::io::stdout).try_init(),
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|err| TelemetryError::Tracing(err.to_string()))
}
