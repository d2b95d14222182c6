//! Error types for the exporter
//!
//! Construction-time failures are fatal and surface as [`ExporterError`].
//! Everything that can go wrong while talking to the runtime during a scrape
//! is a [`FetchError`], which the collector absorbs into `up = 0`.

use hyper::StatusCode;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building the exporter
#[derive(Debug, Error)]
pub enum ExporterError {
    /// The configured runtime socket path does not exist
    #[error("podman socket {} is not available", .path.display())]
    SocketUnavailable { path: PathBuf },
}

/// Errors raised by a single request against the runtime API
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to connect to podman socket: {0}")]
    Connect(#[source] std::io::Error),

    #[error("failed to make request to podman socket: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("invalid request for podman socket: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("did not get successful response from podman socket: {0}")]
    Status(StatusCode),

    #[error("failed to read response from podman socket: {0}")]
    BodyRead(#[source] hyper::Error),

    #[error("failed to unmarshal json from podman response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request to podman socket timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Short, stable name of the failure class, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Connect(_) | FetchError::Handshake(_) => "connect",
            FetchError::Request(_) => "request",
            FetchError::Status(_) => "status",
            FetchError::BodyRead(_) => "body_read",
            FetchError::Decode(_) => "decode",
            FetchError::Timeout(_) => "timeout",
        }
    }
}
