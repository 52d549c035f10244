//! Bounded login retry.

use std::num::NonZeroU32;
use std::time::Duration;

use oncall_adapters::traits::{Credentials, OncallApi, Session};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{ProberError, ProberResult};

/// How often and how patiently to retry a failed login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginPolicy {
    max_attempts: NonZeroU32,
    retry_delay: Duration,
}

impl LoginPolicy {
    /// Creates a policy allowing `max_attempts` logins spaced by `retry_delay`.
    #[must_use]
    pub const fn new(max_attempts: NonZeroU32, retry_delay: Duration) -> Self {
        Self {
            max_attempts,
            retry_delay,
        }
    }

    /// Maximum number of login attempts.
    #[must_use]
    pub const fn max_attempts(self) -> NonZeroU32 {
        self.max_attempts
    }

    /// Pause between two consecutive attempts.
    #[must_use]
    pub const fn retry_delay(self) -> Duration {
        self.retry_delay
    }
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_attempts: NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
            retry_delay: Duration::from_secs(10),
        }
    }
}

/// Logs in, retrying any failure until the policy's attempt budget is spent.
///
/// The delay is applied between attempts only; the final failure returns
/// immediately.
///
/// # Errors
///
/// Returns [`ProberError::AuthenticationExhausted`] carrying the last failure
/// once `max_attempts` logins have failed.
pub async fn login_with_retry<A>(
    api: &A,
    credentials: &Credentials,
    policy: LoginPolicy,
) -> ProberResult<Session>
where
    A: OncallApi + ?Sized,
{
    let max_attempts = policy.max_attempts.get();
    let mut attempt = 0_u32;

    loop {
        attempt += 1;
        match api.login(credentials).await {
            Ok(session) => {
                info!(attempt, user = credentials.username(), "logged in to oncall API");
                return Ok(session);
            }
            Err(err) if attempt >= max_attempts => {
                error!(attempt, error = %err, "login failed, giving up");
                return Err(ProberError::AuthenticationExhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }
            Err(err) => {
                warn!(
                    attempt,
                    max_attempts,
                    delay = ?policy.retry_delay,
                    error = %err,
                    "login failed, retrying"
                );
                sleep(policy.retry_delay).await;
            }
        }
    }
}
