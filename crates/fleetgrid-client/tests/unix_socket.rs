//! Scheduler client against a real HTTP/1.1 server on a Unix socket.
//!
//! The fake agent answers the four unit API routes and counts accepted
//! connections so the tests can check that one transport reuses a single
//! connection.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use fleetgrid_client::*;
use fleetgrid_core::UnitDirective;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    uri: String,
    host: Option<String>,
    body: String,
}

#[derive(Clone, Default)]
struct FakeAgent {
    seen: Arc<Mutex<Vec<Seen>>>,
    connections: Arc<AtomicUsize>,
}

impl FakeAgent {
    fn spawn(&self, dir: &Path) -> PathBuf {
        let path = dir.join("fleet.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let agent = self.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                agent.connections.fetch_add(1, Ordering::SeqCst);
                let agent = agent.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let agent = agent.clone();
                        async move { agent.handle(req).await }
                    });
                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        path
    }

    async fn handle(&self, req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
        let method = req.method().clone();
        let uri = req.uri().to_string();
        let host = req
            .headers()
            .get(http::header::HOST)
            .map(|h| h.to_str().unwrap().to_string());
        let body = req.into_body().collect().await.unwrap().to_bytes();
        self.seen.lock().unwrap().push(Seen {
            method: method.clone(),
            uri: uri.clone(),
            host,
            body: String::from_utf8_lossy(&body).into_owned(),
        });

        let (status, body) = match (method, uri.as_str()) {
            (Method::PUT, "/v1-alpha/units/bad.web.1.service") => (400, "invalid unit"),
            (Method::PUT, _) => (201, ""),
            (Method::DELETE, "/v1-alpha/units/gone.web.1.service") => (404, ""),
            (Method::DELETE, "/v1-alpha/units/stuck.web.1.service") => (500, "busy"),
            (Method::DELETE, _) => (204, ""),
            (Method::GET, "/v1-alpha/state?unitName=app.web.1.service") => (
                200,
                r#"{"states":[{"name":"app.web.1.service","machineID":"m1","systemdSubState":"running"}]}"#,
            ),
            (Method::GET, "/v1-alpha/state") => (200, "{}"),
            (Method::GET, "/v1-alpha/machines") => (
                200,
                r#"{"machines":[{"id":"m1","primaryIP":"10.0.0.1","metadata":{"zone":"a"}}]}"#,
            ),
            _ => (500, "unexpected"),
        };

        Ok(Response::builder()
            .status(status)
            .body(Full::new(Bytes::from(body)))
            .unwrap())
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn unit_api_round_trip_over_one_connection() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::default();
    let socket = agent.spawn(dir.path());

    let transport = UnixTransport::connect(&socket).await.unwrap();
    assert_eq!(transport.path(), socket.as_path());
    let mut api = SchedulerClient::new(transport);

    let unit = vec![UnitDirective::new("Unit", "Description", "app.web.1")];
    api.submit_unit("app.web.1", &UnitSubmission::launched(unit))
        .await
        .unwrap();

    let states = api.query_state(Some("app.web.1")).await.unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].machine_id, "m1");
    assert_eq!(states[0].sub_state(), SubState::Running);

    assert!(api.query_state(None).await.unwrap().is_empty());

    let machines = api.query_machines().await.unwrap();
    assert_eq!(machines[0].metadata["zone"], "a");

    api.delete_unit("app.web.1").await.unwrap();
    api.delete_unit("gone.web.1").await.unwrap();

    assert_eq!(agent.connections.load(Ordering::SeqCst), 1);

    let seen = agent.seen();
    assert_eq!(seen.len(), 6);
    assert_eq!(seen[0].method, Method::PUT);
    assert_eq!(seen[0].host.as_deref(), Some("localhost"));
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "desiredState": "launched",
            "options": [{"section": "Unit", "name": "Description", "value": "app.web.1"}]
        })
    );
    assert_eq!(seen[5].uri, "/v1-alpha/units/gone.web.1.service");
}

#[tokio::test]
async fn rejections_carry_status_and_body() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::default();
    let socket = agent.spawn(dir.path());
    let mut api = SchedulerClient::new(UnixTransport::connect(&socket).await.unwrap());

    let err = api
        .submit_unit("bad.web.1", &UnitSubmission::launched(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::SubmitFailed { status, ref body, .. }
            if status == StatusCode::BAD_REQUEST && body == "invalid unit"
    ));

    let err = api.delete_unit("stuck.web.1").await.unwrap_err();
    assert!(matches!(err, ApiError::DeleteFailed { .. }));
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn connect_to_missing_socket_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.sock");

    let err = UnixTransport::connect(&missing).await.err().unwrap();
    assert!(matches!(err, TransportError::Connect { ref path, .. } if path == &missing));
}

/// Answers the first request on each connection with an empty state list,
/// then hangs up.
fn spawn_one_shot_agent(dir: &Path, connections: Arc<AtomicUsize>) -> PathBuf {
    let path = dir.join("one-shot.sock");
    let listener = UnixListener::bind(&path).unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            connections.fetch_add(1, Ordering::SeqCst);
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}")
                .await;
            let _ = stream.shutdown().await;
        }
    });

    path
}

#[tokio::test]
async fn broken_connection_is_not_reopened() {
    let dir = tempfile::tempdir().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let socket = spawn_one_shot_agent(dir.path(), connections.clone());
    let mut api = SchedulerClient::new(UnixTransport::connect(&socket).await.unwrap());

    assert!(api.query_state(None).await.unwrap().is_empty());

    for _ in 0..3 {
        let err = api.query_state(None).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Closed)));
        assert!(err.is_transient());
    }
    assert!(api.transport().is_closed());
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}
