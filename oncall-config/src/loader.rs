//! Environment lookups and typed value parsing.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::Level;

use crate::{ConfigError, ConfigResult};

/// Source of raw configuration values keyed by environment variable name.
pub trait EnvSource {
    /// Returns the raw value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Seeds the process environment from a `.env` file in the working
    /// directory (or any parent) when one exists. Variables that are
    /// already set take precedence.
    #[must_use]
    pub fn with_dotenv() -> Self {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self
    }
}

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|value| (*value).to_owned())
    }
}

/// Returns the trimmed value for `key`, treating blank values as unset.
pub(crate) fn value(env: &impl EnvSource, key: &str) -> Option<String> {
    env.get(key)
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

pub(crate) fn string_or(env: &impl EnvSource, key: &str, default: &str) -> String {
    value(env, key).unwrap_or_else(|| default.to_owned())
}

pub(crate) fn required(env: &impl EnvSource, key: &'static str) -> ConfigResult<String> {
    value(env, key).ok_or(ConfigError::Missing { key })
}

pub(crate) fn parse_or<T>(env: &impl EnvSource, key: &'static str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match value(env, key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| ConfigError::invalid(key, raw.clone(), err.to_string())),
        None => Ok(default),
    }
}

pub(crate) fn seconds_or(
    env: &impl EnvSource,
    key: &'static str,
    default_secs: u64,
) -> ConfigResult<Duration> {
    parse_or(env, key, default_secs).map(Duration::from_secs)
}

pub(crate) fn millis_or(
    env: &impl EnvSource,
    key: &'static str,
    default_ms: u64,
) -> ConfigResult<Duration> {
    parse_or(env, key, default_ms).map(Duration::from_millis)
}

pub(crate) fn log_level_or(
    env: &impl EnvSource,
    key: &'static str,
    default: Level,
) -> ConfigResult<Level> {
    match value(env, key) {
        Some(raw) => parse_level(&raw)
            .ok_or_else(|| ConfigError::invalid(key, raw.clone(), "unknown log level")),
        None => Ok(default),
    }
}

/// Parses a log level name or a numeric syslog-style level (10 = debug,
/// 20 = info, 30 = warning, 40 = error, 50 = critical).
#[must_use]
pub fn parse_level(raw: &str) -> Option<Level> {
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "trace" | "5" => Level::TRACE,
        "debug" | "10" => Level::DEBUG,
        "info" | "20" => Level::INFO,
        "warn" | "warning" | "30" => Level::WARN,
        "error" | "critical" | "fatal" | "40" | "50" => Level::ERROR,
        _ => return None,
    };
    Some(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fall_back_to_default() {
        let env = HashMap::from([("KEY", "   ")]);
        assert_eq!(string_or(&env, "KEY", "fallback"), "fallback");
        assert_eq!(parse_or(&env, "KEY", 7_u16).unwrap(), 7);
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let env = HashMap::from([("PORT", "ninety")]);
        let err = parse_or::<u16>(&env, "PORT", 1).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn parses_named_and_numeric_levels() {
        assert_eq!(parse_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_level("Warning"), Some(Level::WARN));
        assert_eq!(parse_level("critical"), Some(Level::ERROR));
        assert_eq!(parse_level("20"), Some(Level::INFO));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn required_rejects_missing_keys() {
        let env: HashMap<&str, &str> = HashMap::new();
        assert_eq!(
            required(&env, "TOKEN").unwrap_err(),
            ConfigError::Missing { key: "TOKEN" }
        );
    }
}
