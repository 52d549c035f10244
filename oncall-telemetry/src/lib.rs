//! Observability utilities shared by the prober, the SLA calculator and the
//! log reformatter.
//!
//! Each process owns one [`prometheus::Registry`] and registers a typed
//! metrics struct into it; nothing here is global state.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod tracing_support;

pub use error::{TelemetryError, TelemetryResult};
pub use metrics::{LineOutcome, ProberMetrics, ReformatterMetrics, SlaMetrics, render};
pub use prometheus::Registry;
pub use server::MetricsServer;
pub use shutdown::shutdown_signal;
pub use tracing_support::{LogTarget, init_tracing};
