// Root filesystem capacity

use serde::{Deserialize, Serialize};

use super::{BYTES_PER_GIB, percent_of};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSnapshot {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Used space is derived as `total - free`, saturating at 0.
    pub fn from_capacity(total_bytes: u64, free_bytes: u64) -> Self {
        Self {
            used_bytes: total_bytes.saturating_sub(free_bytes),
            total_bytes,
            free_bytes,
        }
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

    pub fn free_gib(&self) -> f64 {
        self.free_bytes as f64 / BYTES_PER_GIB
    }
}
