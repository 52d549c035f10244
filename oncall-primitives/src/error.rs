//! Shared error definitions for on-call primitives.

use thiserror::Error;

/// Result alias used by the primitive types.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The supplied name does not correspond to a known SLA indicator.
    #[error("unknown sla indicator `{name}`")]
    UnknownIndicator {
        /// The offending indicator name.
        name: String,
    },
}
