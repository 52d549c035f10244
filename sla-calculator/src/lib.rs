//! SLA calculation over the prober's exported metrics.
//!
//! Each tick reads the delete success and attempt counters and the p98
//! create duration from the aggregation backend, classifies them against
//! their objectives, appends them to the `indicators` table and republishes
//! them as gauges.

#![warn(missing_docs, clippy::pedantic)]

mod calculator;
pub mod queries;
pub mod store;

pub use calculator::{SlaCalculator, SlaReport, SlaTargets};
pub use queries::IndicatorQueries;
pub use store::{IndicatorRow, IndicatorStore, SqliteIndicatorStore, StoreError, StoreResult};
