//! SLA indicators derived from prober metrics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The indicators computed by the SLA calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    /// Share of delete-team scenario runs that succeeded, in whole percent.
    DeleteTeamSuccessPercent,
    /// 98th percentile of the create-team scenario duration, in milliseconds.
    CreateTeamDurationP98,
}

impl IndicatorKind {
    /// All known indicator kinds, in evaluation order.
    pub const ALL: [Self; 2] = [Self::DeleteTeamSuccessPercent, Self::CreateTeamDurationP98];

    /// Returns the name used both for the stored row and the republished gauge.
    #[must_use]
    pub const fn metric_name(self) -> &'static str {
        match self {
            Self::DeleteTeamSuccessPercent => "sla_calculator_delete_team_scenario_success_percent",
            Self::CreateTeamDurationP98 => "sla_calculator_p98_create_team_duration_millis",
        }
    }

    /// Classifies `value` against the objective `slo`.
    ///
    /// The success percentage fails strictly below its objective. The p98
    /// duration fails above its objective and also when it is zero or not a
    /// positive number, since a missing observation counts as a violation.
    #[must_use]
    pub fn evaluate(self, value: f64, slo: f64) -> SloStatus {
        let failed = match self {
            Self::DeleteTeamSuccessPercent => value.is_nan() || value < slo,
            Self::CreateTeamDurationP98 => value.is_nan() || value <= 0.0 || value > slo,
        };
        if failed {
            SloStatus::Fail
        } else {
            SloStatus::Success
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metric_name())
    }
}

impl FromStr for IndicatorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.metric_name() == s)
            .ok_or_else(|| Error::UnknownIndicator { name: s.to_owned() })
    }
}

/// Outcome of comparing an indicator against its objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SloStatus {
    /// The objective was met.
    Success,
    /// The objective was violated.
    Fail,
}

impl SloStatus {
    /// Returns `true` when the objective was violated.
    #[must_use]
    pub const fn is_bad(self) -> bool {
        matches!(self, Self::Fail)
    }
}

impl fmt::Display for SloStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Fail => "FAIL",
        })
    }
}

/// A single measured indicator together with its objective and verdict.
///
/// The verdict is always derived from the value and the objective; there is
/// no way to construct an indicator with an arbitrary `is_bad` flag.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlaIndicator {
    kind: IndicatorKind,
    slo: f64,
    value: f64,
    status: SloStatus,
    timestamp: DateTime<Utc>,
}

impl SlaIndicator {
    /// Creates an indicator, classifying `value` against `slo`.
    #[must_use]
    pub fn new(kind: IndicatorKind, slo: f64, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            slo,
            value,
            status: kind.evaluate(value, slo),
            timestamp,
        }
    }

    /// Returns the indicator kind.
    #[must_use]
    pub const fn kind(&self) -> IndicatorKind {
        self.kind
    }

    /// Returns the stored name of the indicator.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.metric_name()
    }

    /// Returns the objective threshold.
    #[must_use]
    pub const fn slo(&self) -> f64 {
        self.slo
    }

    /// Returns the measured value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the derived verdict.
    #[must_use]
    pub const fn status(&self) -> SloStatus {
        self.status
    }

    /// Returns `true` when the indicator violates its objective.
    #[must_use]
    pub const fn is_bad(&self) -> bool {
        self.status.is_bad()
    }

    /// Returns the snapshot instant the indicator was computed for.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Computes the whole-percent share of successful runs.
///
/// Truncates toward zero and returns `0` when `total` is not positive.
/// Multiplying before dividing keeps exact ratios such as `29 / 100` from
/// landing just below the integer.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn success_percent(success: f64, total: f64) -> u32 {
    if total.is_nan() || total <= 0.0 || success.is_nan() || success <= 0.0 {
        return 0;
    }
    (success * 100.0 / total).floor() as u32
}
