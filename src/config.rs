use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::detector::{
    DEFAULT_MIN_HISTORY_COUNT, DEFAULT_STD_DEV_MULTIPLIER, DetectionMethod, DetectionPolicy,
};
use crate::models::MetricKind;
use crate::threshold::ThresholdConfig;

/// Config file used when `CONFIG_FILE` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "menustats.toml";

/// Everything the core reads at each poll. Persistence lives outside the core;
/// this is a plain value handed in by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitoring: MonitoringConfig,
    pub metrics: MetricToggles,
    pub thresholds: Thresholds,
    pub detection: DetectionConfig,
    pub latency: LatencyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub update_interval_ms: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 2000,
        }
    }
}

/// Per-metric enable flags. Disabled metrics are not sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricToggles {
    pub cpu: bool,
    pub memory: bool,
    pub network: bool,
    pub disk: bool,
    pub latency: bool,
}

impl Default for MetricToggles {
    fn default() -> Self {
        Self {
            cpu: true,
            memory: true,
            network: true,
            disk: true,
            latency: true,
        }
    }
}

impl MetricToggles {
    pub fn is_enabled(&self, kind: MetricKind) -> bool {
        match kind {
            MetricKind::Cpu => self.cpu,
            MetricKind::Memory => self.memory,
            MetricKind::Network => self.network,
            MetricKind::Disk => self.disk,
            MetricKind::Latency => self.latency,
        }
    }
}

/// Cutoffs per metric. Network is in percent of link speed, latency in ms,
/// the rest in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub cpu: ThresholdConfig,
    pub memory: ThresholdConfig,
    pub network: ThresholdConfig,
    pub disk: ThresholdConfig,
    pub latency: ThresholdConfig,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: ThresholdConfig::new(50.0, 80.0),
            memory: ThresholdConfig::new(60.0, 85.0),
            network: ThresholdConfig::new(50.0, 80.0),
            disk: ThresholdConfig::new(70.0, 90.0),
            latency: ThresholdConfig::new(50.0, 100.0),
        }
    }
}

impl Thresholds {
    pub fn for_metric(&self, kind: MetricKind) -> &ThresholdConfig {
        match kind {
            MetricKind::Cpu => &self.cpu,
            MetricKind::Memory => &self.memory,
            MetricKind::Network => &self.network,
            MetricKind::Disk => &self.disk,
            MetricKind::Latency => &self.latency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Master switch for anomaly flagging.
    pub enabled: bool,
    pub method: DetectionMethod,
    pub std_dev_multiplier: f64,
    pub min_history_count: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            method: DetectionMethod::Both,
            std_dev_multiplier: DEFAULT_STD_DEV_MULTIPLIER,
            min_history_count: DEFAULT_MIN_HISTORY_COUNT,
        }
    }
}

impl DetectionConfig {
    pub fn policy(&self) -> DetectionPolicy {
        DetectionPolicy {
            method: self.method,
            std_dev_multiplier: self.std_dev_multiplier,
            min_history_count: self.min_history_count,
        }
    }
}

/// TCP handshake target for the latency probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            host: "google.com".into(),
            port: 80,
            timeout_ms: 5000,
        }
    }
}

impl LatencyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AppConfig {
    /// Loads from `CONFIG_FILE` (default `menustats.toml`). A missing file yields defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path, "config file not found; using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!("reading {}: {}", path, e)),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Polling period, never shorter than 1 ms. Configs handed to the monitor at
    /// runtime are not validated, so a zero interval must not reach the timer.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.monitoring.update_interval_ms.max(1))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.monitoring.update_interval_ms > 0,
            "monitoring.update_interval_ms must be > 0, got {}",
            self.monitoring.update_interval_ms
        );
        for kind in MetricKind::ALL {
            let t = self.thresholds.for_metric(kind);
            anyhow::ensure!(
                t.is_valid(),
                "thresholds.{} must be finite with green_max < yellow_max, got {} / {}",
                kind,
                t.green_max,
                t.yellow_max
            );
        }
        anyhow::ensure!(
            (2.0..=6.0).contains(&self.detection.std_dev_multiplier),
            "detection.std_dev_multiplier must be between 2 and 6, got {}",
            self.detection.std_dev_multiplier
        );
        anyhow::ensure!(
            (5..=30).contains(&self.detection.min_history_count),
            "detection.min_history_count must be between 5 and 30, got {}",
            self.detection.min_history_count
        );
        anyhow::ensure!(
            !self.latency.host.is_empty(),
            "latency.host must be non-empty"
        );
        anyhow::ensure!(
            self.latency.port > 0,
            "latency.port must be between 1 and 65535, got {}",
            self.latency.port
        );
        anyhow::ensure!(
            self.latency.timeout_ms > 0,
            "latency.timeout_ms must be > 0, got {}",
            self.latency.timeout_ms
        );
        Ok(())
    }
}
