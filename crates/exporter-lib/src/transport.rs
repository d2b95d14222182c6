//! Socket transport for the runtime API
//!
//! Every request gets its own freshly dialled stream; nothing is pooled or
//! kept alive between requests, so concurrent scrapes never share
//! connection state.

use crate::error::ExporterError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;
use tracing::debug;

/// A byte stream that can carry one HTTP/1.1 exchange
pub trait SocketIo: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> SocketIo for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

pub type BoxedIo = Box<dyn SocketIo>;

/// Connection factory used by the runtime client
///
/// Implementations must hand out an independent stream per call.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> std::io::Result<BoxedIo>;
}

/// Dials a fixed Unix domain socket path
#[derive(Debug, Clone)]
pub struct UnixConnector {
    path: PathBuf,
}

impl UnixConnector {
    /// Create a connector for `path`, failing if nothing exists there
    ///
    /// The check only runs here; a socket that disappears later shows up
    /// as a connect failure on the next scrape.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ExporterError> {
        let path = path.into();
        if !path.exists() {
            return Err(ExporterError::SocketUnavailable { path });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Connector for UnixConnector {
    async fn connect(&self) -> std::io::Result<BoxedIo> {
        let stream = UnixStream::connect(&self.path).await?;
        debug!(socket = %self.path.display(), "Connected to podman socket");
        Ok(Box::new(stream))
    }
}
