// Two-cutoff severity classification.

use serde::{Deserialize, Serialize};

/// Severity tier for a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// Cutoffs for a metric: `v <= green_max` is normal, `v <= yellow_max` is warning,
/// anything above is critical. Callers keep `green_max < yellow_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub green_max: f64,
    pub yellow_max: f64,
}

impl ThresholdConfig {
    pub const fn new(green_max: f64, yellow_max: f64) -> Self {
        Self {
            green_max,
            yellow_max,
        }
    }

    pub fn is_warning(&self, value: f64) -> bool {
        value > self.green_max && value <= self.yellow_max
    }

    pub fn is_critical(&self, value: f64) -> bool {
        value > self.yellow_max
    }

    /// Both cutoffs finite and strictly ordered.
    pub fn is_valid(&self) -> bool {
        self.green_max.is_finite() && self.yellow_max.is_finite() && self.green_max < self.yellow_max
    }
}

pub fn classify(value: f64, config: &ThresholdConfig) -> Severity {
    if value <= config.green_max {
        Severity::Normal
    } else if value <= config.yellow_max {
        Severity::Warning
    } else {
        Severity::Critical
    }
}
