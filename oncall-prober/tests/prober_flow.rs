use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use oncall_adapters::traits::{
    AdapterError, AdapterResult, Credentials, OncallApi, Session, StatusCode, TeamDescriptor,
};
use oncall_prober::{LoginPolicy, Prober, ProberError, ProberState, login_with_retry};
use oncall_telemetry::{ProberMetrics, Registry};

/// In-memory on-call API: logins fail `login_failures` times, teams are a set.
#[derive(Default)]
struct FakeOncall {
    login_failures: u32,
    login_calls: AtomicU32,
    create_delay: Duration,
    fail_transport: bool,
    delete_status: Option<StatusCode>,
    teams: Mutex<HashSet<String>>,
}

impl FakeOncall {
    fn failing_logins(count: u32) -> Self {
        Self {
            login_failures: count,
            ..Self::default()
        }
    }

    fn logins(&self) -> u32 {
        self.login_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OncallApi for FakeOncall {
    async fn login(&self, _credentials: &Credentials) -> AdapterResult<Session> {
        let call = self.login_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.login_failures {
            return Err(AdapterError::Rejected {
                status: StatusCode::UNAUTHORIZED,
                body: String::new(),
            });
        }
        Ok(Session::new("oncall-auth=abc", "tok"))
    }

    async fn create_team(&self, _session: &Session, team: &TeamDescriptor) -> AdapterResult<StatusCode> {
        tokio::time::sleep(self.create_delay).await;
        if self.fail_transport {
            return Err(AdapterError::transport("connection reset"));
        }
        if self.teams.lock().unwrap().insert(team.name.clone()) {
            Ok(StatusCode::CREATED)
        } else {
            Ok(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }

    async fn delete_team(&self, _session: &Session, team_name: &str) -> AdapterResult<StatusCode> {
        if self.fail_transport {
            return Err(AdapterError::transport("connection reset"));
        }
        if let Some(status) = self.delete_status {
            return Ok(status);
        }
        if self.teams.lock().unwrap().remove(team_name) {
            Ok(StatusCode::OK)
        } else {
            Ok(StatusCode::NOT_FOUND)
        }
    }
}

fn policy(max_attempts: u32) -> LoginPolicy {
    LoginPolicy::new(NonZeroU32::new(max_attempts).unwrap(), Duration::from_millis(1))
}

fn credentials() -> Credentials {
    Credentials::new("root", "1234").unwrap()
}

fn prober(api: FakeOncall, max_attempts: u32) -> Prober<FakeOncall> {
    let metrics = ProberMetrics::register(&Registry::new()).unwrap();
    Prober::new(
        api,
        credentials(),
        policy(max_attempts),
        TeamDescriptor::default(),
        metrics,
    )
}

#[tokio::test]
async fn login_gives_up_after_exactly_max_attempts() {
    let api = FakeOncall::failing_logins(u32::MAX);

    let err = login_with_retry(&api, &credentials(), policy(3))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProberError::AuthenticationExhausted { attempts: 3, .. }
    ));
    assert_eq!(api.logins(), 3);
}

#[tokio::test]
async fn login_recovers_before_budget_is_spent() {
    let api = FakeOncall::failing_logins(2);

    let session = login_with_retry(&api, &credentials(), policy(3)).await.unwrap();

    assert_eq!(session.csrf_token(), "tok");
    assert_eq!(api.logins(), 3);
}

#[tokio::test]
async fn single_attempt_policy_does_not_retry() {
    let api = FakeOncall::failing_logins(1);

    let err = login_with_retry(&api, &credentials(), policy(1)).await.unwrap_err();

    assert!(matches!(err, ProberError::AuthenticationExhausted { attempts: 1, .. }));
    assert_eq!(api.logins(), 1);
}

#[tokio::test]
async fn probe_before_login_is_rejected() {
    let mut prober = prober(FakeOncall::default(), 3);

    let err = prober.probe().await.unwrap_err();

    assert!(matches!(err, ProberError::NotAuthenticated));
    assert_eq!(prober.state(), ProberState::Unauthenticated);
    assert_eq!(prober.metrics().delete_total(), 0);
}

#[tokio::test]
async fn repeated_probes_leave_no_residual_team() {
    let mut prober = prober(FakeOncall::default(), 3);
    prober.authenticate().await.unwrap();

    for _ in 0..2 {
        let outcome = prober.probe().await.unwrap();
        assert!(outcome.success);
        assert!(prober.api().teams.lock().unwrap().is_empty());
    }

    assert_eq!(prober.state(), ProberState::Authenticated);
    assert_eq!(prober.metrics().delete_total(), 2);
    assert_eq!(prober.metrics().delete_success_total(), 2);
    assert_eq!(prober.metrics().delete_fail_total(), 0);
}

#[tokio::test]
async fn request_failures_are_counted_not_raised() {
    let api = FakeOncall {
        fail_transport: true,
        create_delay: Duration::from_millis(20),
        ..FakeOncall::default()
    };
    let mut prober = prober(api, 3);
    prober.authenticate().await.unwrap();

    let outcome = prober.probe().await.unwrap();

    assert!(!outcome.success);
    assert!(outcome.duration_ms >= 20.0);
    assert!((prober.metrics().create_duration_ms() - outcome.duration_ms).abs() < f64::EPSILON);
    assert_eq!(prober.metrics().delete_total(), 1);
    assert_eq!(prober.metrics().delete_fail_total(), 1);
    assert_eq!(prober.metrics().delete_success_total(), 0);
}

#[tokio::test]
async fn non_ok_delete_counts_as_failure() {
    let api = FakeOncall {
        delete_status: Some(StatusCode::INTERNAL_SERVER_ERROR),
        ..FakeOncall::default()
    };
    let mut prober = prober(api, 3);
    prober.authenticate().await.unwrap();

    let outcome = prober.probe().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(prober.metrics().delete_total(), 1);
    assert_eq!(prober.metrics().delete_fail_total(), 1);
}

#[tokio::test]
async fn exhausted_authentication_aborts_run() {
    let mut prober = prober(FakeOncall::failing_logins(u32::MAX), 2);

    let err = prober.run(Duration::from_millis(1)).await.unwrap_err();

    assert!(matches!(err, ProberError::AuthenticationExhausted { attempts: 2, .. }));
    assert_eq!(prober.api().logins(), 2);
    assert_eq!(prober.metrics().delete_total(), 0);
}
