//! Podman exporter library
//!
//! This crate provides the core functionality for:
//! - Talking HTTP to the podman API over its Unix socket
//! - Decoding version and container statistics payloads
//! - Mapping them onto the `podman_*` metric vocabulary
//! - Rendering scrape results in the Prometheus text format

pub mod client;
pub mod collector;
pub mod error;
pub mod exposition;
pub mod models;
pub mod observability;
pub mod registry;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::RuntimeClient;
pub use collector::{Collector, CollectorConfig, ScrapeOutcome, ScrapePhase};
pub use error::{ExporterError, FetchError};
pub use models::*;
pub use observability::{ExporterMetrics, StructuredLogger};
pub use registry::{MetricDescriptor, MetricId, MetricRegistry, Sample, ValueKind};
pub use transport::{Connector, UnixConnector};
