//! Configuration management for the on-call observability processes.
//!
//! Every setting is read from environment variables with a documented
//! default. Lookups go through [`loader::EnvSource`] so the schemas can be
//! built from a plain map in tests.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{EnvSource, ProcessEnv};
pub use schema::{ProberConfig, QuerySelector, ReformatterConfig, SlaCalculatorConfig};
