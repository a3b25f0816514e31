// Shared test helpers
#![allow(dead_code)]

use menustats::config::AppConfig;
use menustats::models::*;

/// Config whose latency probe targets a closed local port, so it fails fast
/// instead of reaching the network.
pub fn offline_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.latency.host = "127.0.0.1".into();
    config.latency.port = 9;
    config.latency.timeout_ms = 500;
    config
}

/// Config with every source but the given ones disabled.
pub fn only(enabled: &[MetricKind]) -> AppConfig {
    let mut config = offline_config();
    config.metrics.cpu = enabled.contains(&MetricKind::Cpu);
    config.metrics.memory = enabled.contains(&MetricKind::Memory);
    config.metrics.network = enabled.contains(&MetricKind::Network);
    config.metrics.disk = enabled.contains(&MetricKind::Disk);
    config.metrics.latency = enabled.contains(&MetricKind::Latency);
    config
}

pub fn snapshot_with(
    cpu: CpuSnapshot,
    memory: MemorySnapshot,
    network: NetworkSnapshot,
    disk: DiskSnapshot,
    latency: LatencySnapshot,
) -> SystemSnapshot {
    SystemSnapshot {
        sequence: 1,
        timestamp: 0,
        cpu,
        memory,
        network,
        disk,
        latency,
    }
}

/// Ten samples with mean 10.4 and a population std dev of about 1.02.
pub const SPREAD_HISTORY: [f64; 10] = [10.0, 12.0, 11.0, 9.0, 10.0, 11.0, 10.0, 9.0, 12.0, 10.0];
