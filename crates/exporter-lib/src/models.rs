//! Records decoded from the podman v3 REST API
//!
//! Field names follow the JSON emitted by podman, see
//! <https://docs.podman.io/en/latest/_static/api.html>. Decoding is lenient:
//! missing fields fall back to their zero value and `null` arrays decode as
//! empty, which matches what podman produces for idle hosts.

use serde::{Deserialize, Deserializer, Serialize};

/// Response of `GET /v3.0.0/libpod/version`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeVersionInfo {
    #[serde(rename = "Platform")]
    pub platform: Platform,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "ApiVersion")]
    pub api_version: String,
    #[serde(rename = "MinAPIVersion")]
    pub min_api_version: String,
    #[serde(rename = "GitCommit")]
    pub git_commit: String,
    /// Toolchain the runtime was built with, kept opaque
    #[serde(rename = "GoVersion")]
    pub go_version: String,
    #[serde(rename = "Os")]
    pub os: String,
    #[serde(rename = "Arch")]
    pub arch: String,
    #[serde(rename = "KernelVersion")]
    pub kernel_version: String,
    #[serde(rename = "BuildTime")]
    pub build_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Platform {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Response of `GET /v3.0.0/libpod/containers/stats?stream=false`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerStatsReport {
    /// Error reported by podman alongside the stats, usually `null`
    #[serde(rename = "Error")]
    pub error: Option<serde_json::Value>,
    #[serde(rename = "Stats", deserialize_with = "null_as_default")]
    pub stats: Vec<ContainerStatSample>,
}

impl ContainerStatsReport {
    /// The runtime-side error, if podman attached a meaningful one
    pub fn runtime_error(&self) -> Option<&serde_json::Value> {
        self.error.as_ref().filter(|value| match value {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            serde_json::Value::String(s) => !s.is_empty(),
            _ => true,
        })
    }
}

/// Point-in-time statistics for one running container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerStatSample {
    #[serde(rename = "AvgCPU")]
    pub avg_cpu: f64,
    #[serde(rename = "ContainerID")]
    pub container_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PerCPU", deserialize_with = "null_as_default")]
    pub per_cpu: Vec<u64>,
    #[serde(rename = "CPU")]
    pub cpu: f64,
    #[serde(rename = "CPUNano")]
    pub cpu_nano: u64,
    #[serde(rename = "CPUSystemNano")]
    pub cpu_system_nano: u64,
    #[serde(rename = "DataPoints")]
    pub data_points: i64,
    #[serde(rename = "SystemNano")]
    pub system_nano: u64,
    #[serde(rename = "MemUsage")]
    pub mem_usage: u64,
    #[serde(rename = "MemLimit")]
    pub mem_limit: u64,
    #[serde(rename = "MemPerc")]
    pub mem_perc: f64,
    #[serde(rename = "NetInput")]
    pub net_input: u64,
    #[serde(rename = "NetOutput")]
    pub net_output: u64,
    #[serde(rename = "BlockInput")]
    pub block_input: u64,
    #[serde(rename = "BlockOutput")]
    pub block_output: u64,
    #[serde(rename = "PIDs")]
    pub pids: u64,
    #[serde(rename = "UpTime")]
    pub up_time: u64,
    #[serde(rename = "Duration")]
    pub duration: u64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
