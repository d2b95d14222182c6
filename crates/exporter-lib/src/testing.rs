//! In-memory podman runtime for tests
//!
//! Each `connect` returns one half of a `tokio::io::duplex` pipe and serves
//! HTTP/1.1 on the other half with canned responses.

use crate::transport::{BoxedIo, Connector};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderName, ACCEPT_ENCODING, CONTENT_TYPE, HOST};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Serve,
    Refuse,
    Stall,
}

/// A request as seen by the stub
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub target: String,
    pub host: Option<String>,
    pub content_type: Option<String>,
    pub accept_encoding: Option<String>,
}

#[derive(Clone)]
pub(crate) struct StubRuntime {
    mode: Mode,
    routes: Arc<Mutex<HashMap<String, (StatusCode, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    connections: Arc<AtomicUsize>,
}

impl StubRuntime {
    pub fn new() -> Self {
        Self::with_mode(Mode::Serve)
    }

    /// Every connection attempt is refused
    pub fn refusing() -> Self {
        Self::with_mode(Mode::Refuse)
    }

    /// Connections are accepted but never answered
    pub fn stalled() -> Self {
        Self::with_mode(Mode::Stall)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            routes: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn respond(&self, path: &str, status: StatusCode, body: impl Into<String>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }

    pub fn respond_json(&self, path: &str, body: serde_json::Value) {
        self.respond(path, StatusCode::OK, body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    async fn handle(&self, req: Request<Incoming>) -> Response<Full<Bytes>> {
        let recorded = {
            let header = |name: HeaderName| {
                req.headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            RecordedRequest {
                target: req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default(),
                host: header(HOST),
                content_type: header(CONTENT_TYPE),
                accept_encoding: header(ACCEPT_ENCODING),
            }
        };
        let path = req.uri().path().to_string();
        self.requests.lock().unwrap().push(recorded);

        if self.mode == Mode::Stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        let route = self.routes.lock().unwrap().get(&path).cloned();
        let (status, body) = route.unwrap_or((StatusCode::NOT_FOUND, "not found".to_string()));

        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        response
    }
}

#[async_trait]
impl Connector for StubRuntime {
    async fn connect(&self) -> std::io::Result<BoxedIo> {
        if self.mode == Mode::Refuse {
            return Err(std::io::ErrorKind::ConnectionRefused.into());
        }
        self.connections.fetch_add(1, Ordering::SeqCst);

        let (client, server) = tokio::io::duplex(64 * 1024);
        let stub = self.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let stub = stub.clone();
                async move { Ok::<_, Infallible>(stub.handle(req).await) }
            });
            let _ = http1::Builder::new()
                .serve_connection(TokioIo::new(server), service)
                .await;
        });

        Ok(Box::new(client))
    }
}

/// Serve podman-style responses on a real Unix socket until the runtime stops
pub(crate) fn serve_unix(listener: tokio::net::UnixListener, stub: StubRuntime) {
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let stub = stub.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let stub = stub.clone();
                    async move { Ok::<_, Infallible>(stub.handle(req).await) }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });
}
