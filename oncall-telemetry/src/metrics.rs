//! Typed metric sets registered into an explicit [`Registry`].

use oncall_primitives::{IndicatorKind, SlaIndicator};
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::TelemetryResult;

/// Counters and gauge exported by the synthetic prober.
///
/// Values are cumulative for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ProberMetrics {
    delete_total: IntCounter,
    delete_success_total: IntCounter,
    delete_fail_total: IntCounter,
    create_duration_ms: Gauge,
}

impl ProberMetrics {
    /// Creates the prober metrics and registers them into `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn register(registry: &Registry) -> TelemetryResult<Self> {
        let metrics = Self {
            delete_total: IntCounter::new(
                "prober_delete_team_scenario_total",
                "Total count of runs the delete team scenario to oncall API",
            )?,
            delete_success_total: IntCounter::new(
                "prober_delete_team_scenario_success_total",
                "Total count of success runs the delete team scenario to oncall API",
            )?,
            delete_fail_total: IntCounter::new(
                "prober_delete_team_scenario_fail_total",
                "Total count of failed runs the delete team scenario to oncall API",
            )?,
            create_duration_ms: Gauge::new(
                "prober_create_team_scenario_duration_milliseconds",
                "Duration in milliseconds of runs the create team scenario to oncall API",
            )?,
        };

        registry.register(Box::new(metrics.delete_total.clone()))?;
        registry.register(Box::new(metrics.delete_success_total.clone()))?;
        registry.register(Box::new(metrics.delete_fail_total.clone()))?;
        registry.register(Box::new(metrics.create_duration_ms.clone()))?;
        Ok(metrics)
    }

    /// Records the duration of the latest create step, replacing the previous value.
    pub fn observe_create_duration(&self, duration_ms: f64) {
        self.create_duration_ms.set(duration_ms);
    }

    /// Records that a delete step is about to run.
    pub fn delete_attempted(&self) {
        self.delete_total.inc();
    }

    /// Records the result of a delete step.
    pub fn delete_finished(&self, success: bool) {
        if success {
            self.delete_success_total.inc();
        } else {
            self.delete_fail_total.inc();
        }
    }

    /// Total delete attempts so far.
    #[must_use]
    pub fn delete_total(&self) -> u64 {
        self.delete_total.get()
    }

    /// Successful deletes so far.
    #[must_use]
    pub fn delete_success_total(&self) -> u64 {
        self.delete_success_total.get()
    }

    /// Failed deletes so far.
    #[must_use]
    pub fn delete_fail_total(&self) -> u64 {
        self.delete_fail_total.get()
    }

    /// Latest create duration in milliseconds.
    #[must_use]
    pub fn create_duration_ms(&self) -> f64 {
        self.create_duration_ms.get()
    }
}

/// Gauges republished by the SLA calculator.
#[derive(Debug, Clone)]
pub struct SlaMetrics {
    success_percent: Gauge,
    p98_duration_ms: Gauge,
    store_failures: IntCounter,
}

impl SlaMetrics {
    /// Creates the calculator metrics and registers them into `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn register(registry: &Registry) -> TelemetryResult<Self> {
        let metrics = Self {
            success_percent: Gauge::new(
                IndicatorKind::DeleteTeamSuccessPercent.metric_name(),
                "SLA delete team success percent %",
            )?,
            p98_duration_ms: Gauge::new(
                IndicatorKind::CreateTeamDurationP98.metric_name(),
                "SLA P98 duration millis",
            )?,
            store_failures: IntCounter::new(
                "sla_calculator_store_failures_total",
                "Indicators that could not be persisted",
            )?,
        };

        registry.register(Box::new(metrics.success_percent.clone()))?;
        registry.register(Box::new(metrics.p98_duration_ms.clone()))?;
        registry.register(Box::new(metrics.store_failures.clone()))?;
        Ok(metrics)
    }

    /// Republishes an indicator value on its gauge.
    pub fn publish(&self, indicator: &SlaIndicator) {
        self.gauge(indicator.kind()).set(indicator.value());
    }

    /// Counts an indicator that could not be stored.
    pub fn store_failed(&self) {
        self.store_failures.inc();
    }

    /// Current gauge value for `kind`.
    #[must_use]
    pub fn value(&self, kind: IndicatorKind) -> f64 {
        self.gauge(kind).get()
    }

    /// Indicators that failed to persist so far.
    #[must_use]
    pub fn store_failures(&self) -> u64 {
        self.store_failures.get()
    }

    fn gauge(&self, kind: IndicatorKind) -> &Gauge {
        match kind {
            IndicatorKind::DeleteTeamSuccessPercent => &self.success_percent,
            IndicatorKind::CreateTeamDurationP98 => &self.p98_duration_ms,
        }
    }
}

/// How a log line was turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Matched the expected layout.
    Structured,
    /// Did not match and was passed through as `info`.
    Passthrough,
    /// Matched but could not be parsed.
    Error,
}

impl LineOutcome {
    /// Label value used on the line counter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Passthrough => "passthrough",
            Self::Error => "error",
        }
    }
}

/// Counters exported by the log reformatter.
#[derive(Debug, Clone)]
pub struct ReformatterMetrics {
    lines: IntCounterVec,
}

impl ReformatterMetrics {
    /// Creates the reformatter metrics and registers them into `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn register(registry: &Registry) -> TelemetryResult<Self> {
        let lines = IntCounterVec::new(
            Opts::new("log_reformatter_lines_total", "Log lines reformatted, by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(lines.clone()))?;
        Ok(Self { lines })
    }

    /// Counts one reformatted line.
    pub fn line(&self, outcome: LineOutcome) {
        self.lines.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Lines seen so far with the given outcome.
    #[must_use]
    pub fn lines(&self, outcome: LineOutcome) -> u64 {
        self.lines.with_label_values(&[outcome.as_str()]).get()
    }
}

/// Encodes every metric in `registry` in the Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn render(registry: &Registry) -> TelemetryResult<Vec<u8>> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}
