//! Error types for the reformatter.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while tailing and reformatting.
#[derive(Debug, Error)]
pub enum ReformatError {
    /// The log file does not exist.
    #[error("Log file not found: {}", path.display())]
    MissingFile {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// Underlying I/O failure while reading the log or writing records.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// Record serialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
    /// The line pattern failed to compile.
    #[error("invalid line pattern: {source}")]
    Pattern {
        /// Source [`regex::Error`].
        #[from]
        source: regex::Error,
    },
}

/// Result alias for reformatter operations.
pub type ReformatResult<T> = Result<T, ReformatError>;
