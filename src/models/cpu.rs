// CPU models

use serde::{Deserialize, Serialize};

/// Processor core class; detected once when the CPU source is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoreType {
    Performance,
    Efficiency,
    Unknown,
}

impl CoreType {
    /// Short label used in compact displays ("P", "E", "?").
    pub fn label(self) -> &'static str {
        match self {
            CoreType::Performance => "P",
            CoreType::Efficiency => "E",
            CoreType::Unknown => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreUsage {
    pub id: usize,
    pub core_type: CoreType,
    /// 0-100
    pub usage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuSnapshot {
    /// 0-100, from summed tick deltas across all cores.
    pub total_usage: f64,
    pub cores: Vec<CoreUsage>,
    /// Recent total usage values, oldest first.
    pub history: Vec<f64>,
}

impl CpuSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn cores_of(&self, core_type: CoreType) -> impl Iterator<Item = &CoreUsage> {
        self.cores.iter().filter(move |c| c.core_type == core_type)
    }

    /// Mean usage over cores of one class, or `None` when there are none.
    pub fn average_usage(&self, core_type: CoreType) -> Option<f64> {
        let (sum, count) = self
            .cores_of(core_type)
            .fold((0.0, 0usize), |(sum, count), c| (sum + c.usage, count + 1));
        (count > 0).then(|| sum / count as f64)
    }
}
