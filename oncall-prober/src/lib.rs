//! Synthetic prober for the on-call API.
//!
//! The prober logs in once with bounded retry, then on a fixed interval
//! creates and deletes one well-known team, exporting a delete success/failure
//! counter set and the latest create duration through [`ProberMetrics`].
//!
//! [`ProberMetrics`]: oncall_telemetry::ProberMetrics

#![warn(missing_docs, clippy::pedantic)]

mod auth;
mod error;
mod lifecycle;
mod prober;

pub use auth::{LoginPolicy, login_with_retry};
pub use error::{ProberError, ProberResult};
pub use lifecycle::{InvalidTransition, Lifecycle, ProberEvent, ProberState};
pub use prober::Prober;
