use std::time::{Duration, Instant};

use chrono::Utc;
use oncall_adapters::traits::{Credentials, OncallApi, Session, StatusCode, TeamDescriptor};
use oncall_primitives::ProbeOutcome;
use oncall_telemetry::ProberMetrics;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::auth::{LoginPolicy, login_with_retry};
use crate::lifecycle::{Lifecycle, ProberEvent, ProberState};
use crate::{ProberError, ProberResult};

/// Runs the create/delete team scenario against an [`OncallApi`].
///
/// Each tick always targets the same team, so repeated runs leave nothing
/// behind on the target system.
#[derive(Debug)]
pub struct Prober<A> {
    api: A,
    credentials: Credentials,
    policy: LoginPolicy,
    team: TeamDescriptor,
    metrics: ProberMetrics,
    lifecycle: Lifecycle,
    session: Option<Session>,
}

impl<A> Prober<A>
where
    A: OncallApi,
{
    /// Creates an unauthenticated prober.
    #[must_use]
    pub fn new(
        api: A,
        credentials: Credentials,
        policy: LoginPolicy,
        team: TeamDescriptor,
        metrics: ProberMetrics,
    ) -> Self {
        Self {
            api,
            credentials,
            policy,
            team,
            metrics,
            lifecycle: Lifecycle::new(),
            session: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProberState {
        self.lifecycle.state()
    }

    /// Metrics this prober records into.
    #[must_use]
    pub fn metrics(&self) -> &ProberMetrics {
        &self.metrics
    }

    /// Borrows the underlying API client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Obtains a session, retrying per the configured [`LoginPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`ProberError::AuthenticationExhausted`] when every attempt
    /// failed, or [`ProberError::Lifecycle`] when called mid-probe.
    pub async fn authenticate(&mut self) -> ProberResult<()> {
        let session = login_with_retry(&self.api, &self.credentials, self.policy).await?;
        self.lifecycle.transition(ProberEvent::LoggedIn)?;
        self.session = Some(session);
        Ok(())
    }

    /// Runs one create/delete tick and records its metrics.
    ///
    /// Request failures never surface as errors: the create duration gauge is
    /// set regardless of outcome and the delete step counts exactly one
    /// success or failure.
    ///
    /// # Errors
    ///
    /// Returns [`ProberError::NotAuthenticated`] before a successful
    /// [`authenticate`](Self::authenticate).
    pub async fn probe(&mut self) -> ProberResult<ProbeOutcome> {
        let Some(session) = self.session.as_ref() else {
            return Err(ProberError::NotAuthenticated);
        };
        self.lifecycle.transition(ProberEvent::ProbeStarted)?;

        let attempted_at = Utc::now();
        let duration_ms = create_step(&self.api, session, &self.team, &self.metrics).await;
        let success = delete_step(&self.api, session, &self.team, &self.metrics).await;

        self.lifecycle.transition(ProberEvent::ProbeFinished)?;
        Ok(ProbeOutcome::new(attempted_at, duration_ms, success))
    }

    /// Authenticates if needed, then probes every `interval` forever.
    ///
    /// # Errors
    ///
    /// Only authentication exhaustion ends the loop.
    pub async fn run(&mut self, interval: Duration) -> ProberResult<()> {
        if !self.state().is_authenticated() {
            self.authenticate().await?;
        }
        info!(?interval, team = %self.team.name, "probing started");

        loop {
            let outcome = self.probe().await?;
            debug!(
                duration_ms = outcome.duration_ms,
                success = outcome.success,
                "probe finished"
            );
            sleep(interval).await;
        }
    }
}

async fn create_step<A>(
    api: &A,
    session: &Session,
    team: &TeamDescriptor,
    metrics: &ProberMetrics,
) -> f64
where
    A: OncallApi + ?Sized,
{
    let started = Instant::now();
    match api.create_team(session, team).await {
        Ok(status) => debug!(%status, team = %team.name, "create team finished"),
        Err(err) => error!(error = %err, team = %team.name, "create team request failed"),
    }
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics.observe_create_duration(duration_ms);
    duration_ms
}

async fn delete_step<A>(
    api: &A,
    session: &Session,
    team: &TeamDescriptor,
    metrics: &ProberMetrics,
) -> bool
where
    A: OncallApi + ?Sized,
{
    metrics.delete_attempted();
    let success = match api.delete_team(session, &team.name).await {
        Ok(status) if status == StatusCode::OK => true,
        Ok(status) => {
            warn!(%status, team = %team.name, "delete team returned non-OK status");
            false
        }
        Err(err) => {
            error!(error = %err, team = %team.name, "delete team request failed");
            false
        }
    };
    metrics.delete_finished(success);
    success
}
