use std::convert::Infallible;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use hyper::body::to_bytes;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use oncall_adapters::sage::{SageClient, SageConfig};
use oncall_adapters::traits::{AdapterError, QueryBackend};
use serde_json::Value;

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    authorization: Option<String>,
    source: Option<String>,
    body: Value,
}

fn spawn_backend(status: StatusCode, reply: &'static str) -> (SocketAddr, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    let make_svc = make_service_fn(move |_conn| {
        let sink = Arc::clone(&sink);
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let sink = Arc::clone(&sink);
                async move {
                    let header = |name: &str| {
                        req.headers()
                            .get(name)
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_owned)
                    };
                    let path = req.uri().path().to_owned();
                    let authorization = header("authorization");
                    let source = header("source");
                    let bytes = to_bytes(req.into_body()).await.unwrap_or_default();
                    sink.lock().unwrap().push(Captured {
                        path,
                        authorization,
                        source,
                        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
                    });
                    Ok::<_, Infallible>(
                        Response::builder()
                            .status(status)
                            .body(Body::from(reply))
                            .unwrap(),
                    )
                }
            }))
        }
    });
    let server = Server::bind(&SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).serve(make_svc);
    let addr = server.local_addr();
    tokio::spawn(server);
    (addr, captured)
}

fn client_for(addr: SocketAddr) -> SageClient {
    SageClient::new(SageConfig::new(format!("http://{addr}/api"), "secret-token").unwrap()).unwrap()
}

#[tokio::test]
async fn first_hit_value_is_returned() {
    let (addr, captured) = spawn_backend(StatusCode::OK, r#"{"hits":[{"value":95},{"value":3}]}"#);
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

    let value = client_for(addr).last_value("pql up", at).await.unwrap();
    assert_eq!(value, Some(95.0));

    let requests = captured.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.path, "/api/search");
    assert_eq!(request.authorization.as_deref(), Some("secret-token"));
    assert_eq!(request.source.as_deref(), Some("oncall-sla-calculator-service"));
    assert_eq!(request.body["query"], "pql up");
    assert_eq!(request.body["size"], 100);
    assert_eq!(request.body["startTime"], request.body["endTime"]);
    assert_eq!(request.body["startTime"], "2025-03-01T12:00:00.000Z");
}

#[tokio::test]
async fn empty_hits_mean_no_data() {
    let (addr, _captured) = spawn_backend(StatusCode::OK, r#"{"hits":[]}"#);

    let value = client_for(addr).last_value("pql up", Utc::now()).await.unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
async fn server_error_is_reported() {
    let (addr, _captured) = spawn_backend(StatusCode::INTERNAL_SERVER_ERROR, "boom");

    let err = client_for(addr)
        .last_value("pql up", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Rejected { status, ref body } if status == StatusCode::INTERNAL_SERVER_ERROR && body == "boom"
    ));
}
