use std::time::Duration;

use chrono::{DateTime, Utc};
use oncall_adapters::traits::QueryBackend;
use oncall_primitives::{IndicatorKind, SlaIndicator, success_percent};
use oncall_telemetry::SlaMetrics;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::queries::IndicatorQueries;
use crate::store::IndicatorStore;

/// Objective thresholds the indicators are classified against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaTargets {
    /// Minimum delete success percentage.
    pub success_percent: f64,
    /// Maximum p98 create duration in milliseconds.
    pub p98_duration_millis: f64,
}

impl Default for SlaTargets {
    fn default() -> Self {
        Self {
            success_percent: 99.0,
            p98_duration_millis: 40.0,
        }
    }
}

/// Indicators produced by one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SlaReport {
    /// Delete success percentage indicator.
    pub success_percent: SlaIndicator,
    /// p98 create duration indicator.
    pub p98_duration: SlaIndicator,
    /// Number of indicators the store accepted.
    pub persisted: usize,
}

/// Computes, persists and republishes the SLA indicators.
#[derive(Debug)]
pub struct SlaCalculator<B, S> {
    backend: B,
    store: S,
    queries: IndicatorQueries,
    targets: SlaTargets,
    metrics: SlaMetrics,
}

impl<B, S> SlaCalculator<B, S>
where
    B: QueryBackend,
    S: IndicatorStore,
{
    /// Creates a calculator.
    #[must_use]
    pub fn new(
        backend: B,
        store: S,
        queries: IndicatorQueries,
        targets: SlaTargets,
        metrics: SlaMetrics,
    ) -> Self {
        Self {
            backend,
            store,
            queries,
            targets,
            metrics,
        }
    }

    /// Borrows the indicator store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Metrics this calculator publishes into.
    #[must_use]
    pub fn metrics(&self) -> &SlaMetrics {
        &self.metrics
    }

    /// Runs one tick at snapshot instant `at`.
    ///
    /// Backend failures and missing data degrade to zero values; store
    /// failures are logged and counted. The gauges are republished in every
    /// case.
    pub async fn evaluate(&self, at: DateTime<Utc>) -> SlaReport {
        let success = self
            .fetch("delete success total", self.queries.delete_success(), at)
            .await;
        let total = self
            .fetch("delete attempt total", self.queries.delete_total(), at)
            .await;
        let percent = success_percent(success.unwrap_or(0.0), total.unwrap_or(0.0));
        let success_percent = SlaIndicator::new(
            IndicatorKind::DeleteTeamSuccessPercent,
            self.targets.success_percent,
            f64::from(percent),
            at,
        );

        let p98 = self
            .fetch("p98 create duration", self.queries.create_duration_p98(), at)
            .await
            .unwrap_or(0.0);
        let p98_duration = SlaIndicator::new(
            IndicatorKind::CreateTeamDurationP98,
            self.targets.p98_duration_millis,
            p98,
            at,
        );

        let mut persisted = 0;
        for indicator in [&success_percent, &p98_duration] {
            match self.store.save(indicator).await {
                Ok(()) => persisted += 1,
                Err(err) => {
                    error!(indicator = indicator.name(), error = %err, "failed to persist indicator");
                    self.metrics.store_failed();
                }
            }
            self.metrics.publish(indicator);
            info!(
                indicator = indicator.name(),
                value = indicator.value(),
                slo = indicator.slo(),
                status = %indicator.status(),
                "sla indicator"
            );
        }

        SlaReport {
            success_percent,
            p98_duration,
            persisted,
        }
    }

    /// Evaluates at the current instant every `interval`, forever.
    pub async fn run(&self, interval: Duration) {
        info!(?interval, "sla calculation started");
        loop {
            self.evaluate(Utc::now()).await;
            sleep(interval).await;
        }
    }

    async fn fetch(&self, label: &str, query: &str, at: DateTime<Utc>) -> Option<f64> {
        match self.backend.last_value(query, at).await {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                warn!(series = label, query, "no data returned, using 0");
                None
            }
            Err(err) => {
                error!(series = label, query, error = %err, "query failed, using 0");
                None
            }
        }
    }
}
