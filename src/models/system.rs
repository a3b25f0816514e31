// Aggregate snapshot published by the monitor

use serde::{Deserialize, Serialize};

use super::{CpuSnapshot, DiskSnapshot, LatencySnapshot, MemorySnapshot, NetworkSnapshot};

/// Metric a source produces; also names a flagged metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Cpu,
    Memory,
    Network,
    Disk,
    Latency,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Cpu,
        MetricKind::Memory,
        MetricKind::Network,
        MetricKind::Disk,
        MetricKind::Latency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::Network => "network",
            MetricKind::Disk => "disk",
            MetricKind::Latency => "latency",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One complete poll of every source. Replaced wholesale on each publish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    /// Publication counter; 0 is the initial empty state.
    pub sequence: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub cpu: CpuSnapshot,
    pub memory: MemorySnapshot,
    pub network: NetworkSnapshot,
    pub disk: DiskSnapshot,
    pub latency: LatencySnapshot,
}

impl SystemSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }
}
