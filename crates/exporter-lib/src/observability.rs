//! Observability infrastructure for the exporter
//!
//! Provides:
//! - Exporter self-metrics (build info) in an owned Prometheus registry
//! - Structured JSON logging with tracing

use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts, Registry};
use std::fmt::Display;
use tracing::{debug, error, info, warn};

/// Exporter self-metrics
///
/// Clones share the same underlying registry.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    build_info: GaugeVec,
}

impl ExporterMetrics {
    /// Register the build info gauge for `version` and `revision`
    pub fn new(version: &str, revision: &str) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let build_info = GaugeVec::new(
            Opts::new(
                "podman_exporter_build_info",
                "A metric with a constant '1' value labeled by version and revision from which podman_exporter was built.",
            ),
            &["version", "revision"],
        )?;
        registry.register(Box::new(build_info.clone()))?;
        build_info.with_label_values(&[version, revision]).set(1.0);

        Ok(Self {
            registry,
            build_info,
        })
    }

    /// Current self-metric families
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn build_info(&self) -> &GaugeVec {
        &self.build_info
    }
}

/// Structured logger for exporter lifecycle events
#[derive(Clone)]
pub struct StructuredLogger {
    socket: String,
}

impl StructuredLogger {
    pub fn new(socket: impl Into<String>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    /// Log exporter startup
    pub fn log_startup(&self, version: &str, listen_address: &str, metrics_path: &str) {
        info!(
            event = "exporter_started",
            podman_socket = %self.socket,
            version = %version,
            listen_address = %listen_address,
            metrics_path = %metrics_path,
            "Starting podman_exporter"
        );
    }

    /// Log a fatal startup error
    pub fn log_startup_failure(&self, error: &dyn Display) {
        error!(
            event = "exporter_start_failed",
            podman_socket = %self.socket,
            error = %error,
            "Failed to start podman_exporter"
        );
    }

    /// Log the outcome of an exposition request
    pub fn log_scrape(&self, up: bool, samples: usize, elapsed_ms: u64) {
        if up {
            debug!(
                event = "scrape",
                podman_socket = %self.socket,
                up = true,
                samples = samples,
                elapsed_ms = elapsed_ms,
                "Served podman metrics"
            );
        } else {
            warn!(
                event = "scrape",
                podman_socket = %self.socket,
                up = false,
                samples = samples,
                elapsed_ms = elapsed_ms,
                "Served podman metrics without runtime data"
            );
        }
    }

    /// Log exporter shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "exporter_shutdown",
            podman_socket = %self.socket,
            reason = %reason,
            "Podman exporter shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_is_exported() {
        let metrics = ExporterMetrics::new("0.1.0", "abc123").unwrap();
        let families = metrics.gather();

        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), "podman_exporter_build_info");

        let metric = &families[0].get_metric()[0];
        assert_eq!(metric.get_gauge().get_value(), 1.0);
        let labels: Vec<(&str, &str)> = metric
            .get_label()
            .iter()
            .map(|l| (l.get_name(), l.get_value()))
            .collect();
        assert!(labels.contains(&("version", "0.1.0")));
        assert!(labels.contains(&("revision", "abc123")));
    }

    #[test]
    fn test_metrics_instances_are_independent() {
        let first = ExporterMetrics::new("0.1.0", "a").unwrap();
        let second = ExporterMetrics::new("0.2.0", "b").unwrap();

        assert_eq!(first.build_info().with_label_values(&["0.1.0", "a"]).get(), 1.0);
        assert_eq!(second.gather()[0].get_metric().len(), 1);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("/run/podman/podman.sock");
        assert_eq!(logger.socket, "/run/podman/podman.sock");
    }
}
