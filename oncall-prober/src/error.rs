use oncall_adapters::traits::AdapterError;
use thiserror::Error;

use crate::lifecycle::InvalidTransition;

/// Result alias for prober operations.
pub type ProberResult<T> = Result<T, ProberError>;

/// Errors surfaced by the prober.
#[derive(Debug, Error)]
pub enum ProberError {
    /// Every login attempt failed; probing cannot start.
    #[error("authentication failed after {attempts} attempts: {last_error}")]
    AuthenticationExhausted {
        /// Attempts performed.
        attempts: u32,
        /// Failure of the final attempt.
        #[source]
        last_error: AdapterError,
    },
    /// A probe was requested before a session was obtained.
    #[error("probe requested before authentication")]
    NotAuthenticated,
    /// Lifecycle event arrived out of order.
    #[error(transparent)]
    Lifecycle(#[from] InvalidTransition),
}
