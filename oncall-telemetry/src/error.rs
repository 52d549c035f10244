//! Telemetry errors.

use std::net::SocketAddr;

use thiserror::Error;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised while wiring metrics or logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A metric could not be created, registered or encoded.
    #[error("metrics error: {source}")]
    Metrics {
        /// Source error from the Prometheus client.
        #[from]
        source: prometheus::Error,
    },
    /// The metrics endpoint could not bind its listening socket.
    #[error("failed to bind metrics endpoint on {addr}: {reason}")]
    Bind {
        /// Address the endpoint tried to listen on.
        addr: SocketAddr,
        /// Underlying failure.
        reason: String,
    },
    /// The global tracing subscriber could not be installed.
    #[error("failed to install tracing subscriber: {0}")]
    Tracing(String),
}
