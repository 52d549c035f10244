//! Strongly typed configuration for each process.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

use crate::loader::{
    EnvSource, log_level_or, millis_or, parse_or, required, seconds_or, string_or, value,
};
use crate::{ConfigError, ConfigResult};

const DEFAULT_LOG_LEVEL: Level = Level::DEBUG;

/// Settings for the synthetic prober.
#[derive(Clone, PartialEq, Eq)]
pub struct ProberConfig {
    /// Base URL of the on-call API.
    pub oncall_url: String,
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Pause between probe ticks.
    pub scrape_interval: Duration,
    /// Port the metrics endpoint listens on.
    pub metrics_port: u16,
    /// Default log verbosity.
    pub log_level: Level,
    /// Login attempts before giving up.
    pub login_max_attempts: NonZeroU32,
    /// Pause between failed login attempts.
    pub login_retry_delay: Duration,
    /// Per-request timeout against the on-call API.
    pub request_timeout: Duration,
    /// Name of the team created and deleted on every tick.
    pub team_name: String,
}

impl std::fmt::Debug for ProberConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProberConfig")
            .field("oncall_url", &self.oncall_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("scrape_interval", &self.scrape_interval)
            .field("metrics_port", &self.metrics_port)
            .field("log_level", &self.log_level)
            .field("login_max_attempts", &self.login_max_attempts)
            .field("login_retry_delay", &self.login_retry_delay)
            .field("request_timeout", &self.request_timeout)
            .field("team_name", &self.team_name)
            .finish()
    }
}

impl ProberConfig {
    /// Reads the prober settings from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value cannot be parsed, when the URL or
    /// credentials are blank, or when zero login attempts are requested.
    pub fn from_env(env: &impl EnvSource) -> ConfigResult<Self> {
        let login_max_attempts = parse_or(env, "LOGIN_MAX_ATTEMPTS", 3_u32)?;
        let login_max_attempts = NonZeroU32::new(login_max_attempts).ok_or_else(|| {
            ConfigError::invalid("LOGIN_MAX_ATTEMPTS", "0", "at least one attempt is required")
        })?;

        Ok(Self {
            oncall_url: non_blank(env, "ONCALL_URL", "http://localhost:8080")?,
            username: non_blank(env, "ONCALL_USERNAME", "root")?,
            password: non_blank(env, "ONCALL_PASSWORD", "1234")?,
            scrape_interval: seconds_or(env, "SCRAPE_INTERVAL", 30)?,
            metrics_port: parse_or(env, "METRICS_PORT", 9081)?,
            log_level: log_level_or(env, "LOG_LEVEL", DEFAULT_LOG_LEVEL)?,
            login_max_attempts,
            login_retry_delay: seconds_or(env, "LOGIN_RETRY_DELAY", 10)?,
            request_timeout: seconds_or(env, "REQUEST_TIMEOUT", 10)?,
            team_name: string_or(env, "PROBE_TEAM_NAME", "team-foo"),
        })
    }
}

/// Label selector shared by every aggregation query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySelector {
    /// Value of the `system` label the prober is scraped under.
    pub system: String,
    /// Value of the `group` label the prober is scraped under.
    pub group: String,
    /// Range window, e.g. `1m`.
    pub window: String,
}

/// Settings for the SLA calculator.
#[derive(Clone, PartialEq)]
pub struct SlaCalculatorConfig {
    /// Base URL of the aggregation query backend.
    pub sage_url: String,
    /// Value sent in the `Authorization` header.
    pub sage_token: String,
    /// Pause between calculator ticks.
    pub scrape_interval: Duration,
    /// Port the metrics endpoint listens on.
    pub metrics_port: u16,
    /// Default log verbosity.
    pub log_level: Level,
    /// SQLite database file holding the `indicators` table.
    pub db_path: PathBuf,
    /// Minimum acceptable delete success percentage.
    pub success_percent_slo: f64,
    /// Maximum acceptable p98 create duration in milliseconds.
    pub p98_duration_millis_slo: f64,
    /// Labels and window used to build the queries.
    pub selector: QuerySelector,
    /// Per-request timeout against the query backend.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for SlaCalculatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlaCalculatorConfig")
            .field("sage_url", &self.sage_url)
            .field("sage_token", &"<redacted>")
            .field("scrape_interval", &self.scrape_interval)
            .field("metrics_port", &self.metrics_port)
            .field("log_level", &self.log_level)
            .field("db_path", &self.db_path)
            .field("success_percent_slo", &self.success_percent_slo)
            .field("p98_duration_millis_slo", &self.p98_duration_millis_slo)
            .field("selector", &self.selector)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl SlaCalculatorConfig {
    /// Reads the calculator settings from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `SAGE_AUTH_TOKEN` is absent or a value
    /// cannot be parsed.
    pub fn from_env(env: &impl EnvSource) -> ConfigResult<Self> {
        Ok(Self {
            sage_url: non_blank(env, "SAGE_API_URL", "http://localhost:8000/api")?,
            sage_token: required(env, "SAGE_AUTH_TOKEN")?,
            scrape_interval: seconds_or(env, "SCRAPE_INTERVAL", 60)?,
            metrics_port: parse_or(env, "METRICS_PORT", 9082)?,
            log_level: log_level_or(env, "LOG_LEVEL", DEFAULT_LOG_LEVEL)?,
            db_path: PathBuf::from(string_or(env, "SLA_DB_PATH", "sla.db")),
            success_percent_slo: parse_or(env, "SUCCESS_REMOVE_TEAM_PERCENT_SLA", 99.0)?,
            p98_duration_millis_slo: parse_or(env, "P98_CREATION_TEAM_DURATION_MILLIS_SLA", 40.0)?,
            selector: QuerySelector {
                system: string_or(env, "SLA_QUERY_SYSTEM", "oncall-prober-service"),
                group: string_or(env, "SLA_QUERY_GROUP", "ab5_statsenko"),
                window: string_or(env, "SLA_QUERY_WINDOW", "1m"),
            },
            request_timeout: seconds_or(env, "REQUEST_TIMEOUT", 10)?,
        })
    }
}

/// Settings for the log reformatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReformatterConfig {
    /// File to tail.
    pub log_file: PathBuf,
    /// `service` tag stamped on every record.
    pub service: String,
    /// `environment` tag stamped on every record.
    pub environment: String,
    /// `group` tag stamped on every record.
    pub group: String,
    /// Pause when the file has no new data.
    pub poll_interval: Duration,
    /// Port the metrics endpoint listens on.
    pub metrics_port: u16,
    /// Default log verbosity for diagnostics on stderr.
    pub log_level: Level,
}

impl ReformatterConfig {
    /// Reads the reformatter settings from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value cannot be parsed.
    pub fn from_env(env: &impl EnvSource) -> ConfigResult<Self> {
        Ok(Self {
            log_file: PathBuf::from(string_or(env, "LOG_FILE", "shared-logs/access.log")),
            service: string_or(env, "LOG_SERVICE", "oncall"),
            environment: string_or(env, "LOG_ENVIRONMENT", "production"),
            group: string_or(env, "LOG_GROUP", "ab5_statsenko"),
            poll_interval: millis_or(env, "LOG_POLL_INTERVAL_MS", 100)?,
            metrics_port: parse_or(env, "METRICS_PORT", 9083)?,
            log_level: log_level_or(env, "LOG_LEVEL", DEFAULT_LOG_LEVEL)?,
        })
    }
}

fn non_blank(env: &impl EnvSource, key: &'static str, default: &str) -> ConfigResult<String> {
    match env.get(key) {
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::invalid(key, raw, "cannot be empty")),
        _ => Ok(value(env, key).unwrap_or_else(|| default.to_owned())),
    }
}
