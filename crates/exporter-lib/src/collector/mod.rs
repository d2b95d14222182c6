//! Podman scrape collector
//!
//! A [`Collector`] performs one scrape per call: it fetches version info and
//! container statistics from the runtime, maps them to samples, and reports
//! the up signal together with the cumulative scrape counters. Failures never
//! escape a scrape; they turn into `up = 0`.

mod counters;


pub use counters::CumulativeCounters;

use crate::client::RuntimeClient;
use crate::error::{ExporterError, FetchError};
use crate::models::ContainerStatSample;
use crate::registry::{MetricId, MetricRegistry, Sample};
use crate::transport::UnixConnector;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default deadline for a single request to the runtime socket
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings needed to build a [`Collector`]
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Path of the podman API socket
    pub socket_path: PathBuf,
    /// Per-request deadline; `None` waits indefinitely
    pub fetch_timeout: Option<Duration>,
}

impl CollectorConfig {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
        }
    }

    pub fn fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Stage of a scrape that talks to the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapePhase {
    FetchingVersion,
    FetchingStats,
}

impl fmt::Display for ScrapePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapePhase::FetchingVersion => f.write_str("fetching_version"),
            ScrapePhase::FetchingStats => f.write_str("fetching_stats"),
        }
    }
}

/// Result of one scrape cycle
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// 1 if both fetches succeeded, 0 otherwise
    pub up: f64,
    /// Stage that failed, if any
    pub failed_phase: Option<ScrapePhase>,
    pub samples: Vec<Sample>,
}

impl ScrapeOutcome {
    pub fn is_up(&self) -> bool {
        self.up == 1.0
    }

    /// Samples of one metric, in emission order
    pub fn samples_of(&self, id: MetricId) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter().filter(move |s| s.id() == id)
    }
}

/// Collects podman metrics on demand
///
/// Safe to share across concurrent scrapes: only the counters are shared
/// mutable state and they are updated atomically.
pub struct Collector {
    client: RuntimeClient,
    registry: Arc<MetricRegistry>,
    counters: CumulativeCounters,
}

impl Collector {
    /// Create a collector talking to the socket named in `config`
    ///
    /// Fails with [`ExporterError::SocketUnavailable`] if the socket path
    /// does not exist. No request is made here.
    pub fn new(config: CollectorConfig, registry: Arc<MetricRegistry>) -> Result<Self, ExporterError> {
        let connector = UnixConnector::new(config.socket_path)?;
        let client = RuntimeClient::new(Arc::new(connector), config.fetch_timeout);
        Ok(Self::with_client(client, registry))
    }

    /// Create a collector on top of an existing client
    pub fn with_client(client: RuntimeClient, registry: Arc<MetricRegistry>) -> Self {
        Self {
            client,
            registry,
            counters: CumulativeCounters::default(),
        }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn counters(&self) -> &CumulativeCounters {
        &self.counters
    }

    /// Run one scrape cycle
    pub async fn scrape(&self) -> ScrapeOutcome {
        let start = Instant::now();
        self.counters.record_scrape();

        let (up, failed_phase, mut samples) = match self.fetch_samples().await {
            Ok(samples) => (1.0, None, samples),
            Err((phase, err)) => {
                self.counters.record_failure();
                warn!(
                    phase = %phase,
                    error_kind = err.kind(),
                    error = %err,
                    "Podman scrape failed"
                );
                (0.0, Some(phase), Vec::new())
            }
        };

        samples.push(self.registry.unlabeled(MetricId::Up, up));
        samples.push(
            self.registry
                .unlabeled(MetricId::ScrapesTotal, self.counters.total_scrapes() as f64),
        );
        samples.push(self.registry.unlabeled(
            MetricId::ScrapeFailuresTotal,
            self.counters.scrape_failures() as f64,
        ));

        debug!(
            up = up,
            samples = samples.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Podman scrape complete"
        );

        ScrapeOutcome {
            up,
            failed_phase,
            samples,
        }
    }

    /// Fetch version info, then container stats
    ///
    /// Any failure discards everything gathered so far in this cycle.
    async fn fetch_samples(&self) -> Result<Vec<Sample>, (ScrapePhase, FetchError)> {
        let version = self
            .client
            .version()
            .await
            .map_err(|e| (ScrapePhase::FetchingVersion, e))?;

        let mut samples = vec![self.registry.sample(
            MetricId::VersionInfo,
            1.0,
            vec![version.version],
        )];

        let report = self
            .client
            .container_stats()
            .await
            .map_err(|e| (ScrapePhase::FetchingStats, e))?;

        if let Some(runtime_error) = report.runtime_error() {
            warn!(error = %runtime_error, "Podman returned an error alongside container stats");
        }

        debug!(containers = report.stats.len(), "Fetched container stats");

        samples.reserve(report.stats.len() * CONTAINER_METRICS.len());
        for stat in &report.stats {
            self.push_container_samples(stat, &mut samples);
        }

        Ok(samples)
    }

    fn push_container_samples(&self, stat: &ContainerStatSample, samples: &mut Vec<Sample>) {
        for (id, value) in container_values(stat) {
            samples.push(self.registry.sample(
                id,
                value,
                vec![stat.container_id.clone(), stat.name.clone()],
            ));
        }
    }
}

/// Metrics emitted once per container, in emission order
pub const CONTAINER_METRICS: [MetricId; 12] = [
    MetricId::ContainerCpu,
    MetricId::ContainerCpuAverage,
    MetricId::ContainerCpuUsageTotal,
    MetricId::ContainerCpuUsageKernel,
    MetricId::ContainerMemUsage,
    MetricId::ContainerMemLimit,
    MetricId::ContainerMemPercent,
    MetricId::ContainerNetInput,
    MetricId::ContainerNetOutput,
    MetricId::ContainerBlockInput,
    MetricId::ContainerBlockOutput,
    MetricId::ContainerPids,
];

/// Raw values widened to f64, no scaling or unit conversion
fn container_values(stat: &ContainerStatSample) -> [(MetricId, f64); 12] {
    [
        (MetricId::ContainerCpu, stat.cpu),
        (MetricId::ContainerCpuAverage, stat.avg_cpu),
        (MetricId::ContainerCpuUsageTotal, stat.cpu_nano as f64),
        (MetricId::ContainerCpuUsageKernel, stat.cpu_system_nano as f64),
        (MetricId::ContainerMemUsage, stat.mem_usage as f64),
        (MetricId::ContainerMemLimit, stat.mem_limit as f64),
        (MetricId::ContainerMemPercent, stat.mem_perc),
        (MetricId::ContainerNetInput, stat.net_input as f64),
        (MetricId::ContainerNetOutput, stat.net_output as f64),
        (MetricId::ContainerBlockInput, stat.block_input as f64),
        (MetricId::ContainerBlockOutput, stat.block_output as f64),
        (MetricId::ContainerPids, stat.pids as f64),
    ]
}
