// Memory pressure from VM page counts.

use super::{linux, lock, run_blocking};
use crate::error::SampleError;
use crate::history::RollingHistory;
use crate::models::MemorySnapshot;
use std::sync::{Arc, Mutex};
use sysinfo::System;
use tracing::instrument;

const FALLBACK_PAGE_SIZE: u64 = 4096;

/// VM page counts by class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmPages {
    pub active: u64,
    pub wired: u64,
    pub compressed: u64,
    pub free: u64,
}

/// One memory reading in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub active_bytes: u64,
    pub wired_bytes: u64,
    pub compressed_bytes: u64,
    pub free_bytes: u64,
}

impl MemoryReading {
    pub fn from_pages(pages: VmPages, page_size: u64, total_bytes: u64) -> Self {
        Self {
            total_bytes,
            active_bytes: pages.active.saturating_mul(page_size),
            wired_bytes: pages.wired.saturating_mul(page_size),
            compressed_bytes: pages.compressed.saturating_mul(page_size),
            free_bytes: pages.free.saturating_mul(page_size),
        }
    }
}

pub struct MemorySource {
    history: RollingHistory<f64>,
    page_size: u64,
    sys: Arc<Mutex<System>>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            history: RollingHistory::new(),
            page_size: linux::page_size().unwrap_or(FALLBACK_PAGE_SIZE),
            sys: Arc::new(Mutex::new(sys)),
        }
    }

    /// Page size captured at construction.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    #[instrument(skip(self), fields(source = "memory", operation = "sample"))]
    pub async fn sample(&mut self) -> MemorySnapshot {
        let sys = self.sys.clone();
        let page_size = self.page_size;
        let reading = run_blocking(move || {
            let mut sys = lock(&sys, "sysinfo memory")?;
            sys.refresh_memory();
            let total = sys.total_memory();
            match linux::read_vm_pages() {
                Ok(pages) => Ok(MemoryReading::from_pages(pages, page_size, total)),
                Err(SampleError::Unavailable(_)) => Ok(MemoryReading {
                    total_bytes: total,
                    active_bytes: sys.used_memory(),
                    free_bytes: sys.free_memory(),
                    ..MemoryReading::default()
                }),
                Err(e) => Err(e),
            }
        })
        .await;

        match reading {
            Ok(reading) => self.ingest(reading),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "read_vm_pages",
                    "memory sample failed"
                );
                MemorySnapshot::empty()
            }
        }
    }

    /// The returned snapshot carries the history as it stood before this reading;
    /// the reading's usage is appended afterwards.
    pub fn ingest(&mut self, reading: MemoryReading) -> MemorySnapshot {
        let used_bytes = reading
            .active_bytes
            .saturating_add(reading.wired_bytes)
            .saturating_add(reading.compressed_bytes);
        let snapshot = MemorySnapshot {
            used_bytes,
            total_bytes: reading.total_bytes,
            active_bytes: reading.active_bytes,
            wired_bytes: reading.wired_bytes,
            compressed_bytes: reading.compressed_bytes,
            free_bytes: reading.free_bytes,
            history: self.history.to_vec(),
        };
        self.history.push(snapshot.usage_percent());
        snapshot
    }
}
