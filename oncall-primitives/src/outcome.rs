//! Probe outcome records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of running the create/delete scenario once.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Wall-clock instant the scenario started.
    pub attempted_at: DateTime<Utc>,
    /// Duration of the create step in milliseconds.
    pub duration_ms: f64,
    /// Whether the delete step returned HTTP 200.
    pub success: bool,
}

impl ProbeOutcome {
    /// Creates a new outcome.
    #[must_use]
    pub const fn new(attempted_at: DateTime<Utc>, duration_ms: f64, success: bool) -> Self {
        Self {
            attempted_at,
            duration_ms,
            success,
        }
    }
}
