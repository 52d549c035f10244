//! Line classification and conversion.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use oncall_telemetry::LineOutcome;
use regex::Regex;

use crate::ReformatResult;
use crate::record::{ServiceTags, StructuredLogRecord, format_timestamp};

const LINE_PATTERN: &str = r"^(?P<timestamp>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3}) - (?P<logger>\w+) - (?P<level>\w+) - (?P<message>.*)";
const SOURCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Converts raw lines into [`StructuredLogRecord`]s. Never drops a line.
#[derive(Debug, Clone)]
pub struct LineParser {
    pattern: Regex,
    tags: ServiceTags,
}

impl LineParser {
    /// Creates a parser stamping `tags` on every record.
    ///
    /// # Errors
    ///
    /// Returns [`ReformatError::Pattern`](crate::ReformatError::Pattern) if
    /// the line pattern fails to compile.
    pub fn new(tags: ServiceTags) -> ReformatResult<Self> {
        Ok(Self {
            pattern: Regex::new(LINE_PATTERN)?,
            tags,
        })
    }

    /// Tags stamped on every record.
    #[must_use]
    pub fn tags(&self) -> &ServiceTags {
        &self.tags
    }

    /// Reformats `line`, using the current instant for unparsed lines.
    #[must_use]
    pub fn reformat(&self, line: &str) -> (StructuredLogRecord, LineOutcome) {
        self.reformat_at(line, Utc::now())
    }

    /// Reformats `line`; `now` stamps passthrough and error records.
    ///
    /// Lines that do not match the pattern become `info` records carrying
    /// the trimmed text. Matching lines whose timestamp cannot be parsed
    /// become `error` records embedding the failure and the original line.
    #[must_use]
    pub fn reformat_at(&self, line: &str, now: DateTime<Utc>) -> (StructuredLogRecord, LineOutcome) {
        let trimmed = line.trim();
        let Some(captures) = self.pattern.captures(trimmed) else {
            return (
                StructuredLogRecord::plain(now, "info", trimmed, &self.tags),
                LineOutcome::Passthrough,
            );
        };

        match NaiveDateTime::parse_from_str(&captures["timestamp"], SOURCE_TIMESTAMP_FORMAT) {
            Ok(timestamp) => (
                StructuredLogRecord {
                    timestamp: format_timestamp(timestamp.and_utc()),
                    level: captures["level"].to_lowercase(),
                    logger: Some(captures["logger"].to_owned()),
                    message: captures["message"].to_owned(),
                    tags: self.tags.clone(),
                },
                LineOutcome::Structured,
            ),
            Err(err) => (
                StructuredLogRecord::plain(
                    now,
                    "error",
                    format!("Log parsing error: {err} - Original line: {trimmed}"),
                    &self.tags,
                ),
                LineOutcome::Error,
            ),
        }
    }

    /// Record printed when the log file is missing at startup.
    #[must_use]
    pub fn missing_file(&self, path: &Path) -> StructuredLogRecord {
        StructuredLogRecord::plain(
            Utc::now(),
            "error",
            format!("Log file not found: {}", path.display()),
            &self.tags,
        )
    }
}
