// Root filesystem capacity. Instantaneous gauges; no history or deltas.

use super::{lock, run_blocking};
use crate::error::SampleError;
use crate::models::DiskSnapshot;
use std::path::Path;
use std::sync::{Arc, Mutex};
use sysinfo::Disks;
use tracing::instrument;

pub struct DiskSource {
    disks: Arc<Mutex<Disks>>,
}

impl Default for DiskSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskSource {
    pub fn new() -> Self {
        Self {
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
        }
    }

    #[instrument(skip(self), fields(source = "disk", operation = "sample"))]
    pub async fn sample(&mut self) -> DiskSnapshot {
        let disks = self.disks.clone();
        let result = run_blocking(move || {
            let mut disks = lock(&disks, "sysinfo disks")?;
            disks.refresh(true);
            disks
                .list()
                .iter()
                .find(|d| d.mount_point() == Path::new("/"))
                .map(|d| DiskSnapshot::from_capacity(d.total_space(), d.available_space()))
                .ok_or(SampleError::NotFound("root filesystem"))
        })
        .await;

        result.unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "read_root_filesystem",
                "disk sample failed"
            );
            DiskSnapshot::empty()
        })
    }
}
