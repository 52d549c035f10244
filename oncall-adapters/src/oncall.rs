//! On-call API client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use hyper::header::{CONTENT_TYPE, COOKIE, HeaderMap, SET_COOKIE};
use hyper::{Body, Request, StatusCode, Uri};
use serde::Deserialize;
use tracing::debug;
use urlencoding::encode;

use crate::http_client::{HyperClient, build_https_client, endpoint, sanitize_base_url, send};
use crate::traits::{
    AdapterError, AdapterResult, Credentials, OncallApi, Session, TeamDescriptor,
};

const CSRF_HEADER: &str = "x-csrf-token";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Configuration for [`OncallClient`].
#[derive(Clone, Debug)]
pub struct OncallConfig {
    base_url: String,
    timeout: Duration,
}

impl OncallConfig {
    /// Creates a configuration for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the URL is blank or invalid.
    pub fn new(base_url: impl AsRef<str>) -> AdapterResult<Self> {
        Ok(Self {
            base_url: sanitize_base_url(base_url.as_ref())?,
            timeout: Duration::from_secs(10),
        })
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the sanitized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Client for the on-call login and team endpoints.
pub struct OncallClient {
    client: HyperClient,
    base_url: String,
    login: Uri,
    teams: Uri,
    timeout: Duration,
}

impl fmt::Debug for OncallClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OncallClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OncallClient {
    /// Constructs a client from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if an endpoint URL is invalid.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: OncallConfig) -> AdapterResult<Self> {
        Ok(Self {
            client: build_https_client(),
            login: endpoint(&config.base_url, "/login")?,
            teams: endpoint(&config.base_url, "/api/v0/teams")?,
            base_url: config.base_url,
            timeout: config.timeout,
        })
    }

    fn team_uri(&self, team_name: &str) -> AdapterResult<Uri> {
        endpoint(&self.base_url, &format!("/api/v0/teams/{}", encode(team_name)))
    }
}

#[async_trait]
impl OncallApi for OncallClient {
    async fn login(&self, credentials: &Credentials) -> AdapterResult<Session> {
        let form = format!(
            "username={}&password={}",
            encode(credentials.username()),
            encode(credentials.password())
        );
        let request = Request::post(self.login.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Body::from(form))
            .map_err(|err| AdapterError::transport(format!("failed to build login request: {err}")))?;

        let response = send(&self.client, request, self.timeout).await?;
        if response.status != StatusCode::OK {
            return Err(AdapterError::Rejected {
                status: response.status,
                body: response.body_text(),
            });
        }

        let cookie = session_cookie(&response.headers)
            .ok_or_else(|| AdapterError::response("login response carried no session cookie"))?;
        let payload: LoginResponse = serde_json::from_slice(&response.body)
            .map_err(|err| AdapterError::response(format!("failed to decode login response: {err}")))?;

        Ok(Session::new(cookie, payload.csrf_token))
    }

    async fn create_team(&self, session: &Session, team: &TeamDescriptor) -> AdapterResult<StatusCode> {
        let body = serde_json::to_vec(team)
            .map_err(|err| AdapterError::response(format!("failed to encode team: {err}")))?;
        let request = authorized(Request::post(self.teams.clone()), session)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(Body::from(body))
            .map_err(|err| AdapterError::transport(format!("failed to build create request: {err}")))?;

        let response = send(&self.client, request, self.timeout).await?;
        debug!(
            status = %response.status,
            body = %response.body_text(),
            team = %team.name,
            "create team response"
        );
        Ok(response.status)
    }

    async fn delete_team(&self, session: &Session, team_name: &str) -> AdapterResult<StatusCode> {
        let request = authorized(Request::delete(self.team_uri(team_name)?), session)
            .body(Body::empty())
            .map_err(|err| AdapterError::transport(format!("failed to build delete request: {err}")))?;

        let response = send(&self.client, request, self.timeout).await?;
        debug!(
            status = %response.status,
            body = %response.body_text(),
            team = team_name,
            "delete team response"
        );
        Ok(response.status)
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    csrf_token: String,
}

fn authorized(builder: hyper::http::request::Builder, session: &Session) -> hyper::http::request::Builder {
    builder
        .header(CSRF_HEADER, session.csrf_token())
        .header(COOKIE, session.cookie())
}

/// Joins the `name=value` part of every `Set-Cookie` header into a single
/// `Cookie` header value.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use hyper::header::HeaderValue;

    use super::*;

    #[test]
    fn session_cookie_joins_pairs() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("oncall-auth=abc; Path=/; HttpOnly"));
        headers.append(SET_COOKIE, HeaderValue::from_static("session=xyz; Path=/"));
        assert_eq!(
            session_cookie(&headers).as_deref(),
            Some("oncall-auth=abc; session=xyz")
        );
    }

    #[test]
    fn session_cookie_absent() {
        assert!(session_cookie(&HeaderMap::new()).is_none());
    }

    #[test]
    fn team_uri_encodes_name() {
        let client = OncallClient::new(OncallConfig::new("http://oncall.local/").unwrap()).unwrap();
        let uri = client.team_uri("team foo").unwrap();
        assert_eq!(uri.path(), "/api/v0/teams/team%20foo");
    }

    #[test]
    fn login_response_parsing() {
        let parsed: LoginResponse =
            serde_json::from_str(r#"{"csrf_token": "tok", "name": "root"}"#).unwrap();
        assert_eq!(parsed.csrf_token, "tok");
    }
}
