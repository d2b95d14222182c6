//! Exporter configuration
//!
//! Values are layered, lowest precedence first: built-in defaults, an
//! optional config file, `PODMAN_EXPORTER_*` environment variables, and
//! command-line flags.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prometheus exporter for podman container statistics
#[derive(Debug, Parser)]
#[command(name = "podman_exporter")]
#[command(author, version, about = "Prometheus exporter for podman container stats", long_about = None)]
pub struct Cli {
    /// Configuration file (any format supported by the `config` crate)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to listen on for web interface and telemetry
    #[arg(long = "web.listen-address")]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long = "web.metrics-path")]
    pub metrics_path: Option<String>,

    /// Path to the podman socket to scrape
    #[arg(long = "podman.socket")]
    pub podman_socket: Option<PathBuf>,

    /// Deadline for each request to the podman socket in milliseconds, 0 disables it
    #[arg(long = "podman.timeout-ms")]
    pub fetch_timeout_ms: Option<u64>,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long = "log.level")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log.format", value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Text => "text",
        }
    }
}

/// Exporter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// Address for the metrics HTTP server
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Path serving the metrics
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// Podman API socket
    #[serde(default = "default_podman_socket")]
    pub podman_socket: PathBuf,

    /// Per-request deadline towards podman, 0 disables it
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_listen_address() -> String {
    "0.0.0.0:9101".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_podman_socket() -> PathBuf {
    PathBuf::from("/var/run/podman/podman.sock")
}

fn default_fetch_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl ExporterConfig {
    /// Load configuration from file, environment and flags
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = &cli.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        let config = builder
            .add_source(config::Environment::with_prefix("PODMAN_EXPORTER"))
            .set_override_option("listen_address", cli.listen_address.clone())?
            .set_override_option("metrics_path", cli.metrics_path.clone())?
            .set_override_option(
                "podman_socket",
                cli.podman_socket.as_deref().map(path_value),
            )?
            .set_override_option(
                "fetch_timeout_ms",
                cli.fetch_timeout_ms.map(|ms| ms.to_string()),
            )?
            .set_override_option("log_level", cli.log_level.clone())?
            .set_override_option("log_format", cli.log_format.map(|f| f.as_str()))?
            .build()
            .context("Failed to load configuration")?;

        let config: ExporterConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values the HTTP server cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.metrics_path.starts_with('/') {
            bail!("metrics path {:?} must start with '/'", self.metrics_path);
        }
        if self.metrics_path == "/" {
            bail!("metrics path must not be '/', it serves the landing page");
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_address
            .parse()
            .with_context(|| format!("Invalid listen address {:?}", self.listen_address))
    }

    /// Deadline for one podman request, `None` when disabled
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
