use std::sync::Arc;
use std::time::Duration;

use hyper::body::{Bytes, to_bytes};
use hyper::client::HttpConnector;
use hyper::{Body, Client, HeaderMap, Request, StatusCode, Uri};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use tokio::time::timeout;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::traits::{AdapterError, AdapterResult};

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Status, headers and fully buffered body of a response.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl RawResponse {
    pub(crate) fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Builds a client that speaks both plain HTTP and HTTPS.
pub(crate) fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let connector = HttpsConnector::from((http, Arc::new(config)));

    Client::builder().build::<_, Body>(connector)
}

/// Sends `request` and buffers the whole response, bounded by `limit`.
pub(crate) async fn send(
    client: &HyperClient,
    request: Request<Body>,
    limit: Duration,
) -> AdapterResult<RawResponse> {
    let target = request.uri().clone();
    let exchange = async {
        let response = client
            .request(request)
            .await
            .map_err(|err| AdapterError::transport(format!("request to {target} failed: {err}")))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body()).await.map_err(|err| {
            AdapterError::transport(format!("failed to read response from {target}: {err}"))
        })?;
        Ok::<_, AdapterError>(RawResponse {
            status,
            headers,
            body,
        })
    };

    timeout(limit, exchange)
        .await
        .map_err(|_| AdapterError::Timeout { limit })?
}

/// Trims whitespace and trailing slashes, then checks the result is an
/// absolute http(s) URL.
pub(crate) fn sanitize_base_url(input: &str) -> AdapterResult<String> {
    let base = input.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(AdapterError::configuration("URL cannot be empty"));
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AdapterError::configuration(
            "base URL must start with http:// or https://",
        ));
    }
    base.parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("invalid base URL: {err}")))?;
    Ok(base.to_owned())
}

pub(crate) fn endpoint(base: &str, path: &str) -> AdapterResult<Uri> {
    format!("{base}{path}")
        .parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("invalid endpoint {base}{path}: {err}")))
}
