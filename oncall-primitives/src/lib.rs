//! Core shared types for the on-call prober and SLA pipeline.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod indicator;
mod outcome;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// SLA indicators and the pass/fail rules that classify them.
pub use indicator::{IndicatorKind, SlaIndicator, SloStatus, success_percent};
/// Result of a single synthetic probe run.
pub use outcome::ProbeOutcome;
