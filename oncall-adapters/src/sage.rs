//! Aggregation query backend client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Request, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http_client::{HyperClient, build_https_client, endpoint, sanitize_base_url, send};
use crate::traits::{AdapterError, AdapterResult, QueryBackend};

const SOURCE_HEADER: &str = "source";
const SERVICE_NAME: &str = "oncall-sla-calculator-service";
const DEFAULT_RESULT_SIZE: u32 = 100;

/// Configuration for [`SageClient`].
#[derive(Clone)]
pub struct SageConfig {
    base_url: String,
    token: String,
    timeout: Duration,
}

impl fmt::Debug for SageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SageConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SageConfig {
    /// Creates a configuration for the backend at `base_url` authenticated
    /// with `token`, sent verbatim in the `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the URL or token is blank,
    /// or the URL is invalid.
    pub fn new(base_url: impl AsRef<str>, token: impl Into<String>) -> AdapterResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(AdapterError::configuration("Token cannot be empty"));
        }
        Ok(Self {
            base_url: sanitize_base_url(base_url.as_ref())?,
            token,
            timeout: Duration::from_secs(10),
        })
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the backend's `/search` endpoint.
pub struct SageClient {
    client: HyperClient,
    search: Uri,
    token: String,
    timeout: Duration,
}

impl fmt::Debug for SageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SageClient")
            .field("search", &self.search)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SageClient {
    /// Constructs a client from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the search endpoint is invalid.
    pub fn new(config: SageConfig) -> AdapterResult<Self> {
        Ok(Self {
            client: build_https_client(),
            search: endpoint(&config.base_url, "/search")?,
            token: config.token,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl QueryBackend for SageClient {
    async fn last_value(&self, query: &str, at: DateTime<Utc>) -> AdapterResult<Option<f64>> {
        let instant = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let payload = SearchRequest {
            query,
            size: DEFAULT_RESULT_SIZE,
            start_time: &instant,
            end_time: &instant,
        };
        let body = serde_json::to_vec(&payload)
            .map_err(|err| AdapterError::response(format!("failed to encode search request: {err}")))?;

        let request = Request::post(self.search.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, self.token.as_str())
            .header(SOURCE_HEADER, SERVICE_NAME)
            .body(Body::from(body))
            .map_err(|err| AdapterError::transport(format!("failed to build search request: {err}")))?;

        let response = send(&self.client, request, self.timeout).await?;
        if !response.status.is_success() {
            return Err(AdapterError::Rejected {
                status: response.status,
                body: response.body_text(),
            });
        }

        let value = first_hit_value(&response.body)?;
        debug!(query, at = %instant, ?value, "search result");
        Ok(value)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    size: u32,
    start_time: &'a str,
    end_time: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    value: Value,
}

/// Extracts the first hit's value; `null`, missing or empty `hits` mean no data.
fn first_hit_value(body: &[u8]) -> AdapterResult<Option<f64>> {
    let parsed: Option<SearchResponse> = serde_json::from_slice(body)
        .map_err(|err| AdapterError::response(format!("failed to decode search response: {err}")))?;

    let Some(hit) = parsed.and_then(|response| response.hits.into_iter().next()) else {
        return Ok(None);
    };

    match hit.value {
        Value::Null => Ok(None),
        Value::Number(number) => Ok(number.as_f64()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|err| AdapterError::response(format!("non-numeric hit value `{text}`: {err}"))),
        other => Err(AdapterError::response(format!("unexpected hit value {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_hit_wins() {
        let body = br#"{"hits": [{"value": 95, "ts": "x"}, {"value": 10}]}"#;
        assert_eq!(first_hit_value(body).unwrap(), Some(95.0));
    }

    #[test]
    fn empty_and_null_mean_no_data() {
        assert_eq!(first_hit_value(br#"{"hits": []}"#).unwrap(), None);
        assert_eq!(first_hit_value(b"null").unwrap(), None);
        assert_eq!(first_hit_value(b"{}").unwrap(), None);
        assert_eq!(first_hit_value(br#"{"hits": [{"value": null}]}"#).unwrap(), None);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(
            first_hit_value(br#"{"hits": [{"value": "37.5"}]}"#).unwrap(),
            Some(37.5)
        );
        assert!(first_hit_value(br#"{"hits": [{"value": "n/a"}]}"#).is_err());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(
            first_hit_value(b"<html>"),
            Err(AdapterError::Response { .. })
        ));
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let request = SearchRequest {
            query: "pql up",
            size: DEFAULT_RESULT_SIZE,
            start_time: "2025-01-01T00:00:00.000Z",
            end_time: "2025-01-01T00:00:00.000Z",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["startTime"], "2025-01-01T00:00:00.000Z");
        assert_eq!(json["endTime"], "2025-01-01T00:00:00.000Z");
        assert_eq!(json["size"], 100);
        assert_eq!(json["query"], "pql up");
    }

    #[test]
    fn config_rejects_blank_token() {
        assert!(SageConfig::new("http://sage.local/api", " ").is_err());
    }
}
