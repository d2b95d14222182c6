//! Runtime API client
//!
//! Issues plain `GET` requests against the podman REST API over a
//! [`Connector`] and decodes the JSON bodies.

use crate::error::FetchError;
use crate::models::{ContainerStatsReport, RuntimeVersionInfo};
use crate::transport::Connector;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Version-info endpoint
pub const VERSION_PATH: &str = "/v3.0.0/libpod/version";

/// Container statistics endpoint
pub const CONTAINER_STATS_PATH: &str = "/v3.0.0/libpod/containers/stats";

/// Query selecting a single, non-streaming stats report
pub const CONTAINER_STATS_QUERY: &str = "stream=false";

/// Synthetic host used for requests over the socket
const UNIX_HOST: &str = "unix";

/// Client for the podman REST API
#[derive(Clone)]
pub struct RuntimeClient {
    connector: Arc<dyn Connector>,
    /// Deadline for one complete request; `None` waits indefinitely
    timeout: Option<Duration>,
}

impl RuntimeClient {
    pub fn new(connector: Arc<dyn Connector>, timeout: Option<Duration>) -> Self {
        Self { connector, timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Fetch `/v3.0.0/libpod/version`
    pub async fn version(&self) -> Result<RuntimeVersionInfo, FetchError> {
        self.fetch(VERSION_PATH, None).await
    }

    /// Fetch a single stats report for every running container
    pub async fn container_stats(&self) -> Result<ContainerStatsReport, FetchError> {
        self.fetch(CONTAINER_STATS_PATH, Some(CONTAINER_STATS_QUERY))
            .await
    }

    /// GET `path` with an optional query string and decode the JSON body
    ///
    /// Only a `200 OK` response is read; any failure yields no data at all.
    pub async fn fetch<T>(&self, path: &str, query: Option<&str>) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let target = match query {
            Some(query) if !query.is_empty() => format!("{path}?{query}"),
            _ => path.to_string(),
        };
        let url = format!("http://{UNIX_HOST}{target}");

        let body = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.get(&target, &url))
                .await
                .map_err(|_| {
                    error!(url = %url, timeout_ms = limit.as_millis() as u64, "Request to podman socket timed out");
                    FetchError::Timeout(limit)
                })??,
            None => self.get(&target, &url).await?,
        };

        serde_json::from_slice(&body).map_err(|e| {
            error!(url = %url, error = %e, "Failed to unmarshal json from podman response");
            FetchError::Decode(e)
        })
    }

    /// Perform one request/response exchange on a fresh connection
    async fn get(&self, target: &str, url: &str) -> Result<Bytes, FetchError> {
        let io = self.connector.connect().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to connect to podman socket");
            FetchError::Connect(e)
        })?;

        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(io))
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to make request to podman socket");
                FetchError::Handshake(e)
            })?;

        let _connection = AbortOnDrop(tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!(error = %e, "Podman socket connection closed with error");
            }
        }));

        let request = Request::builder()
            .method(Method::GET)
            .uri(target)
            .header(HOST, UNIX_HOST)
            .header(CONTENT_TYPE, "application/json")
            .body(Empty::<Bytes>::new())?;

        let response = sender.send_request(request).await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to make request to podman socket");
            FetchError::Handshake(e)
        })?;

        let status = response.status();
        debug!(url = %url, status_code = status.as_u16(), "Podman socket request done");

        if status != StatusCode::OK {
            error!(url = %url, status_code = status.as_u16(), "Did not get successful response from podman socket");
            return Err(FetchError::Status(status));
        }

        let collected = response.into_body().collect().await.map_err(|e| {
            error!(url = %url, status_code = status.as_u16(), error = %e, "Failed to read response from podman socket");
            FetchError::BodyRead(e)
        })?;

        Ok(collected.to_bytes())
    }
}

/// Stops the connection driver when the exchange ends or is cancelled
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
