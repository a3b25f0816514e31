// Memory models

use serde::{Deserialize, Serialize};

use super::{BYTES_PER_GIB, percent_of};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    /// active + wired + compressed; free memory is not counted as used.
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub active_bytes: u64,
    pub wired_bytes: u64,
    pub compressed_bytes: u64,
    pub free_bytes: u64,
    /// Recent usage percentages, oldest first.
    pub history: Vec<f64>,
}

impl MemorySnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn usage_percent(&self) -> f64 {
        percent_of(self.used_bytes, self.total_bytes)
    }

    pub fn used_gib(&self) -> f64 {
        self.used_bytes as f64 / BYTES_PER_GIB
    }

    pub fn total_gib(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_GIB
    }
}
