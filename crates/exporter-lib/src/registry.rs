//! Metric vocabulary of the exporter
//!
//! The registry is built once at startup and then only read. Samples carry a
//! shared handle to their descriptor so an outcome can be encoded without
//! going back to the registry.

use std::fmt;
use std::sync::Arc;

/// Namespace prefixed to every exported metric
pub const NAMESPACE: &str = "podman";

const CONTAINER_LABELS: &[&str] = &["container_id", "name"];

/// (subsystem, name, help, kind, labels)
type Definition = (
    &'static str,
    &'static str,
    &'static str,
    ValueKind,
    &'static [&'static str],
);

/// Kind of value a metric carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Gauge,
    Counter,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Gauge => f.write_str("gauge"),
            ValueKind::Counter => f.write_str("counter"),
        }
    }
}

/// Every metric the exporter can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricId {
    Up,
    ScrapesTotal,
    ScrapeFailuresTotal,
    VersionInfo,
    ContainerCpu,
    ContainerCpuAverage,
    ContainerCpuUsageTotal,
    ContainerCpuUsageKernel,
    ContainerMemUsage,
    ContainerMemLimit,
    ContainerMemPercent,
    ContainerNetInput,
    ContainerNetOutput,
    ContainerBlockInput,
    ContainerBlockOutput,
    ContainerPids,
}

impl MetricId {
    /// All metrics, in registry order
    pub const ALL: [MetricId; 16] = [
        MetricId::Up,
        MetricId::ScrapesTotal,
        MetricId::ScrapeFailuresTotal,
        MetricId::VersionInfo,
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

    fn index(self) -> usize {
        self as usize
    }

    fn definition(self) -> Definition {
        use ValueKind::{Counter, Gauge};
        match self {
            MetricId::Up => ("", "up", "Was the last scrape of podman successful.", Gauge, &[]),
            MetricId::ScrapesTotal => (
                "exporter",
                "scrapes_total",
                "Current total podman scrapes.",
                Counter,
                &[],
            ),
            MetricId::ScrapeFailuresTotal => (
                "exporter",
                "scrape_failures_total",
                "Current total podman scrape failures.",
                Counter,
                &[],
            ),
            MetricId::VersionInfo => ("version", "info", "Podman version info.", Gauge, &["version"]),
            MetricId::ContainerCpu => (
                "container",
                "cpu",
                "Container CPU usage as a percentage.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerCpuAverage => (
                "container",
                "cpu_average",
                "Container average CPU usage as a percentage.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerCpuUsageTotal => (
                "container",
                "cpu_usage_total",
                "Container total CPU time consumed in nanoseconds.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerCpuUsageKernel => (
                "container",
                "cpu_usage_kernel",
                "Container CPU time spent in kernel mode in nanoseconds.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerMemUsage => (
                "container",
                "mem_usage",
                "Container memory usage in bytes.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerMemLimit => (
                "container",
                "mem_limit",
                "Container memory limit in bytes.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerMemPercent => (
                "container",
                "mem_percent",
                "Container memory usage as a percentage of the limit.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerNetInput => (
                "container",
                "net_input",
                "Container network bytes received.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerNetOutput => (
                "container",
                "net_output",
                "Container network bytes sent.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerBlockInput => (
                "container",
                "block_input",
                "Container block device bytes read.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerBlockOutput => (
                "container",
                "block_output",
                "Container block device bytes written.",
                Gauge,
                CONTAINER_LABELS,
            ),
            MetricId::ContainerPids => (
                "container",
                "pids",
                "Number of processes running in the container.",
                Gauge,
                CONTAINER_LABELS,
            ),
        }
    }
}

/// Static description of one metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub id: MetricId,
    pub fq_name: String,
    pub help: String,
    pub kind: ValueKind,
    pub label_names: Vec<String>,
}

/// One emitted value
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub descriptor: Arc<MetricDescriptor>,
    pub value: f64,
    pub label_values: Vec<String>,
}

impl Sample {
    pub fn id(&self) -> MetricId {
        self.descriptor.id
    }

    /// Value of the named label, if the descriptor has it
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .label_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }
}

/// Immutable table of metric descriptors
#[derive(Debug)]
pub struct MetricRegistry {
    descriptors: Vec<Arc<MetricDescriptor>>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    /// Build the full vocabulary under the `podman` namespace
    pub fn new() -> Self {
        let descriptors = MetricId::ALL
            .iter()
            .map(|&id| {
                let (subsystem, name, help, kind, labels) = id.definition();
                Arc::new(MetricDescriptor {
                    id,
                    fq_name: build_fq_name(NAMESPACE, subsystem, name),
                    help: help.to_string(),
                    kind,
                    label_names: labels.iter().map(|l| l.to_string()).collect(),
                })
            })
            .collect();

        Self { descriptors }
    }

    /// Every metric that may ever be emitted
    pub fn describe(&self) -> impl Iterator<Item = &MetricDescriptor> + '_ {
        self.descriptors.iter().map(Arc::as_ref)
    }

    pub fn descriptor(&self, id: MetricId) -> &MetricDescriptor {
        &self.descriptors[id.index()]
    }

    /// Pair a descriptor with a value and its label values
    ///
    /// Label values are kept exactly as given.
    pub fn sample(&self, id: MetricId, value: f64, label_values: Vec<String>) -> Sample {
        let descriptor = Arc::clone(&self.descriptors[id.index()]);
        debug_assert_eq!(descriptor.label_names.len(), label_values.len());
        Sample {
            descriptor,
            value,
            label_values,
        }
    }

    /// Sample for a metric without labels
    pub fn unlabeled(&self, id: MetricId, value: f64) -> Sample {
        self.sample(id, value, Vec::new())
    }
}

/// Join non-empty name parts with `_`
fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}
