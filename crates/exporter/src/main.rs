//! Podman Exporter - Prometheus exporter for podman containers
//!
//! Serves podman version info and per-container statistics, read from the
//! podman API socket on every scrape.

use anyhow::Result;
use clap::Parser;
use exporter_lib::{
    exposition, Collector, CollectorConfig, ExporterMetrics, MetricRegistry, StructuredLogger,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

use config::{Cli, ExporterConfig, LogFormat};

const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");
const EXPORTER_REVISION: &str = match option_env!("PODMAN_EXPORTER_REVISION") {
    Some(revision) => revision,
    None => "unknown",
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ExporterConfig::load(&cli)?;

    init_tracing(&config)?;

    let logger = StructuredLogger::new(config.podman_socket.display().to_string());
    logger.log_startup(EXPORTER_VERSION, &config.listen_address, &config.metrics_path);

    let registry = Arc::new(MetricRegistry::new());
    let descriptors = exposition::validate_descriptors(&registry)?;
    debug!(metrics = descriptors.len(), "Metric descriptors registered");

    let collector_config =
        CollectorConfig::new(&config.podman_socket).fetch_timeout(config.fetch_timeout());
    let collector = match Collector::new(collector_config, registry) {
        Ok(collector) => Arc::new(collector),
        Err(e) => {
            logger.log_startup_failure(&e);
            return Err(e.into());
        }
    };

    let metrics = ExporterMetrics::new(EXPORTER_VERSION, EXPORTER_REVISION)?;
    let state = Arc::new(api::AppState::new(
        collector,
        metrics,
        logger.clone(),
        config.metrics_path.clone(),
    ));

    let shutdown_logger = logger.clone();
    api::serve(config.socket_addr()?, state, async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => shutdown_logger.log_shutdown("SIGINT received"),
            Err(e) => {
                warn!(error = %e, "Unable to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        }
    })
    .await?;

    info!("Shutting down");
    Ok(())
}

/// Initialize tracing; `RUST_LOG` takes precedence over the configured level
fn init_tracing(config: &ExporterConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }

    Ok(())
}
