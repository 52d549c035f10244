//! Shared adapter traits and data structures.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use hyper::StatusCode;

/// Result alias used by adapters.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Error type shared by adapter implementations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Adapter is misconfigured.
    #[error("adapter not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// Transport-level failures (connect, TLS, protocol).
    #[error("adapter transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The request did not complete within the configured limit.
    #[error("request timed out after {limit:?}")]
    Timeout {
        /// Configured per-request limit.
        limit: Duration,
    },

    /// The remote side answered with an unexpected status.
    #[error("remote rejected request with {status}: {body}")]
    Rejected {
        /// Status code returned by the remote side.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The remote side returned a body that could not be understood.
    #[error("adapter response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },
}

impl AdapterError {
    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for malformed responses.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Login credentials for the on-call API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] when either value is blank.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> AdapterResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(AdapterError::configuration("Username cannot be empty"));
        }
        if password.trim().is_empty() {
            return Err(AdapterError::configuration("Password cannot be empty"));
        }
        Ok(Self { username, password })
    }

    /// Returns the user name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Authenticated session: cookie header value plus CSRF token.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    cookie: String,
    csrf_token: String,
}

impl Session {
    /// Creates a session from its parts.
    #[must_use]
    pub fn new(cookie: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
            csrf_token: csrf_token.into(),
        }
    }

    /// Value for the `Cookie` header.
    #[must_use]
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Value for the `X-CSRF-TOKEN` header.
    #[must_use]
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

/// Team payload accepted by `POST /api/v0/teams`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDescriptor {
    /// Team name, also the resource identifier used for deletion.
    pub name: String,
    /// Scheduling time zone.
    pub scheduling_timezone: String,
    /// Contact e-mail.
    pub email: String,
    /// Slack channel.
    pub slack_channel: String,
}

impl TeamDescriptor {
    /// Name of the team the prober creates and deletes by default.
    pub const DEFAULT_PROBE_NAME: &'static str = "team-foo";

    /// Builds the probe descriptor for `name` with derived contact fields.
    #[must_use]
    pub fn probe(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            scheduling_timezone: "US/Pacific".to_owned(),
            email: format!("{name}@example.com"),
            slack_channel: format!("#{name}"),
            name,
        }
    }
}

impl Default for TeamDescriptor {
    fn default() -> Self {
        Self::probe(Self::DEFAULT_PROBE_NAME)
    }
}

/// Operations the prober needs from the on-call API.
#[async_trait]
pub trait OncallApi: Send + Sync {
    /// Logs in and returns a fresh session.
    async fn login(&self, credentials: &Credentials) -> AdapterResult<Session>;

    /// Creates a team, returning the response status.
    async fn create_team(&self, session: &Session, team: &TeamDescriptor) -> AdapterResult<StatusCode>;

    /// Deletes a team by name, returning the response status.
    async fn delete_team(&self, session: &Session, team_name: &str) -> AdapterResult<StatusCode>;
}

/// Aggregation backend able to evaluate a query at one instant.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Returns the first value produced by `query` evaluated at `at`, or
    /// `None` when the backend has no data.
    async fn last_value(&self, query: &str, at: DateTime<Utc>) -> AdapterResult<Option<f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_descriptor_derives_contacts() {
        let team = TeamDescriptor::default();
        assert_eq!(team.name, "team-foo");
        assert_eq!(team.email, "team-foo@example.com");
        assert_eq!(team.slack_channel, "#team-foo");
        assert_eq!(team.scheduling_timezone, "US/Pacific");
    }

    #[test]
    fn credentials_reject_blank_values() {
        assert!(Credentials::new("", "secret").is_err());
        assert!(Credentials::new("root", "  ").is_err());
        assert!(Credentials::new("root", "secret").is_ok());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let credentials = Credentials::new("root", "hunter2").unwrap();
        let session = Session::new("oncall-auth=abc", "csrf-xyz");
        assert!(!format!("{credentials:?}").contains("hunter2"));
        let session_debug = format!("{session:?}");
        assert!(!session_debug.contains("abc"));
        assert!(!session_debug.contains("csrf-xyz"));
    }
}
