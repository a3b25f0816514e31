// Anomaly detection: threshold breaches and statistical outliers over rolling history.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::{MetricKind, SystemSnapshot};
use crate::threshold::{Severity, ThresholdConfig, classify};

/// Standard deviations at or below this are treated as a flat series.
const MIN_STD_DEV: f64 = 0.1;

pub const DEFAULT_STD_DEV_MULTIPLIER: f64 = 4.0;
pub const DEFAULT_MIN_HISTORY_COUNT: usize = 10;

/// Which arms of the detector are consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Thresholds,
    Outliers,
    #[default]
    Both,
}

impl DetectionMethod {
    pub fn uses_thresholds(self) -> bool {
        matches!(self, DetectionMethod::Thresholds | DetectionMethod::Both)
    }

    pub fn uses_outliers(self) -> bool {
        matches!(self, DetectionMethod::Outliers | DetectionMethod::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionPolicy {
    pub method: DetectionMethod,
    /// Deviations from the mean, in standard deviations, before a value is an outlier.
    pub std_dev_multiplier: f64,
    /// History length required before the outlier arm is consulted.
    pub min_history_count: usize,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            method: DetectionMethod::Both,
            std_dev_multiplier: DEFAULT_STD_DEV_MULTIPLIER,
            min_history_count: DEFAULT_MIN_HISTORY_COUNT,
        }
    }
}

/// Population mean and standard deviation; `None` for an empty series.
pub fn mean_and_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Outlier arm. Inactive until `history` holds `min_history_count` samples and
/// never fires on a flat series.
pub fn is_outlier(value: f64, history: &[f64], policy: &DetectionPolicy) -> bool {
    if history.len() < policy.min_history_count {
        return false;
    }
    let Some((mean, std_dev)) = mean_and_std_dev(history) else {
        return false;
    };
    if std_dev <= MIN_STD_DEV {
        return false;
    }
    (value - mean).abs() / std_dev > policy.std_dev_multiplier
}

/// Threshold arm: anything above normal.
pub fn breaches_threshold(value: f64, thresholds: &ThresholdConfig) -> bool {
    classify(value, thresholds) != Severity::Normal
}

/// Combines the arms selected by `policy.method`.
pub fn is_flagged(
    value: f64,
    history: &[f64],
    thresholds: &ThresholdConfig,
    policy: &DetectionPolicy,
) -> bool {
    let threshold_hit = policy.method.uses_thresholds() && breaches_threshold(value, thresholds);
    let outlier_hit = policy.method.uses_outliers() && is_outlier(value, history, policy);
    threshold_hit || outlier_hit
}

/// Evaluates every enabled metric of `snapshot` and returns the flagged ones in
/// [`MetricKind::ALL`] order.
///
/// Network uses the larger of send/receive as a percentage of link speed, compared
/// against the elementwise max of both histories. Disk has no history and only
/// honours the threshold arm. Latency is skipped when the last probe failed.
pub fn active_alerts(snapshot: &SystemSnapshot, config: &AppConfig) -> Vec<MetricKind> {
    if !config.detection.enabled {
        return Vec::new();
    }
    let policy = config.detection.policy();
    let thresholds = &config.thresholds;

    MetricKind::ALL
        .into_iter()
        .filter(|&kind| config.metrics.is_enabled(kind))
        .filter(|&kind| match kind {
            MetricKind::Cpu => is_flagged(
                snapshot.cpu.total_usage,
                &snapshot.cpu.history,
                &thresholds.cpu,
                &policy,
            ),
            MetricKind::Memory => is_flagged(
                snapshot.memory.usage_percent(),
                &snapshot.memory.history,
                &thresholds.memory,
                &policy,
            ),
            MetricKind::Network => is_flagged(
                snapshot.network.peak_percent(),
                &snapshot.network.peak_history_percent(),
                &thresholds.network,
                &policy,
            ),
            MetricKind::Disk => {
                policy.method.uses_thresholds()
                    && breaches_threshold(snapshot.disk.usage_percent(), &thresholds.disk)
            }
            MetricKind::Latency => snapshot.latency.latency_ms.is_some_and(|ms| {
                is_flagged(ms, &snapshot.latency.history, &thresholds.latency, &policy)
            }),
        })
        .collect()
}
