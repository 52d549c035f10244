//! Configuration errors.

use thiserror::Error;

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key was absent or blank.
    #[error("missing required setting {key}")]
    Missing {
        /// Environment variable name.
        key: &'static str,
    },
    /// A key was present but its value could not be used.
    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        /// Environment variable name.
        key: &'static str,
        /// The raw value that was rejected.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Convenience constructor for rejected values.
    #[must_use]
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
