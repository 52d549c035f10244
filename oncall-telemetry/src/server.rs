//! Pull-based `/metrics` endpoint.

use std::convert::Infallible;
use std::net::{Ipv4Addr, SocketAddr};

use hyper::header::CONTENT_TYPE;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use prometheus::{Registry, TEXT_FORMAT};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::metrics::render;
use crate::{TelemetryError, TelemetryResult};

const METRICS_PATH: &str = "/metrics";

/// HTTP server exposing one registry for scraping.
#[derive(Debug, Clone)]
pub struct MetricsServer {
    addr: SocketAddr,
    registry: Registry,
}

impl MetricsServer {
    /// Creates a server listening on all interfaces at `port`.
    #[must_use]
    pub fn new(port: u16, registry: Registry) -> Self {
        Self::bind_to(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)), registry)
    }

    /// Creates a server listening on an explicit address.
    #[must_use]
    pub fn bind_to(addr: SocketAddr, registry: Registry) -> Self {
        Self { addr, registry }
    }

    /// Binds the listener and serves requests on a background task.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port `0` was requested.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Bind`] if the socket cannot be bound.
    pub fn spawn(self) -> TelemetryResult<(SocketAddr, JoinHandle<()>)> {
        let Self { addr, registry } = self;

        let make_service = make_service_fn(move |_conn| {
            let registry = registry.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |request| {
                    let registry = registry.clone();
                    async move { Ok::<_, Infallible>(respond(&request, &registry)) }
                }))
            }
        });

        let server = Server::try_bind(&addr)
            .map_err(|err| TelemetryError::Bind {
                addr,
                reason: err.to_string(),
            })?
            .serve(make_service);
        let local_addr = server.local_addr();

        let handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                error!(error = %err, "metrics endpoint stopped");
            }
        });

        Ok((local_addr, handle))
    }
}

fn respond(request: &Request<Body>, registry: &Registry) -> Response<Body> {
    debug!(method = %request.method(), path = request.uri().path(), "metrics request");

    if request.method() != Method::GET || request.uri().path() != METRICS_PATH {
        return status_only(StatusCode::NOT_FOUND);
    }

    match render(registry) {
        Ok(body) => Response::builder()
            .header(CONTENT_TYPE, TEXT_FORMAT)
            .body(Body::from(body))
            .unwrap_or_else(|_| status_only(StatusCode::INTERNAL_SERVER_ERROR)),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            status_only(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn status_only(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}
