//! Reformatted record shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Fixed tags stamped on every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTags {
    /// Emitting service.
    pub service: String,
    /// Deployment environment.
    pub environment: String,
    /// Owning team.
    pub group: String,
}

impl Default for ServiceTags {
    fn default() -> Self {
        Self {
            service: "oncall".to_owned(),
            environment: "production".to_owned(),
            group: "ab5_statsenko".to_owned(),
        }
    }
}

/// One reformatted log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredLogRecord {
    /// ISO-8601 UTC instant with a `Z` suffix.
    pub timestamp: String,
    /// Lowercase level name.
    pub level: String,
    /// Logger name, absent for passthrough and error records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    /// Message text.
    pub message: String,
    /// Fixed tags.
    #[serde(flatten)]
    pub tags: ServiceTags,
}

impl StructuredLogRecord {
    /// Builds a record without a logger, used for passthrough and error records.
    #[must_use]
    pub fn plain(
        timestamp: DateTime<Utc>,
        level: &str,
        message: impl Into<String>,
        tags: &ServiceTags,
    ) -> Self {
        Self {
            timestamp: format_timestamp(timestamp),
            level: level.to_owned(),
            logger: None,
            message: message.into(),
            tags: tags.clone(),
        }
    }
}

/// Renders `instant` as `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}
