// Round-trip latency models

use serde::{Deserialize, Serialize};

/// Smallest upper bound for a latency sparkline, in ms.
const SPARKLINE_FLOOR_MS: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySnapshot {
    /// `None` when the probe failed or timed out.
    pub latency_ms: Option<f64>,
    /// Successful measurements only, oldest first.
    pub history: Vec<f64>,
}

impl LatencySnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// "—" when absent, one decimal below 1 ms, whole ms otherwise.
    pub fn formatted(&self) -> String {
        match self.latency_ms {
            Some(ms) if ms < 1.0 => format!("{ms:.1}ms"),
            Some(ms) => format!("{ms:.0}ms"),
            None => "—".to_string(),
        }
    }

    pub fn sparkline_max(&self) -> f64 {
        self.history
            .iter()
            .copied()
            .fold(SPARKLINE_FLOOR_MS, f64::max)
    }
}
