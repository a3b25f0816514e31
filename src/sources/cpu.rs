// CPU usage from per-core tick deltas.

use super::{linux, run_blocking};
use crate::history::RollingHistory;
use crate::models::{CoreType, CoreUsage, CpuSnapshot};
use std::collections::HashMap;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::instrument;

/// Cumulative ticks for one logical core. `id` is the kernel's CPU number, which
/// stays fixed when other CPUs go offline and drop out of the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreTicks {
    pub id: usize,
    pub user: u64,
    pub system: u64,
    pub idle: u64,
    pub nice: u64,
}

impl CoreTicks {
    /// Per-field difference against an earlier reading; counters that went
    /// backwards contribute 0.
    fn delta(&self, previous: &CoreTicks) -> CoreTicks {
        CoreTicks {
            id: self.id,
            user: self.user.saturating_sub(previous.user),
            system: self.system.saturating_sub(previous.system),
            idle: self.idle.saturating_sub(previous.idle),
            nice: self.nice.saturating_sub(previous.nice),
        }
    }

    fn busy(&self) -> u64 {
        self.user + self.system + self.nice
    }

    fn total(&self) -> u64 {
        self.busy() + self.idle
    }

    /// Busy share of a delta, 0-100; 0 when no ticks elapsed.
    fn usage_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.busy() as f64 / total as f64 * 100.0
        }
    }
}

pub struct CpuSource {
    history: RollingHistory<f64>,
    previous: HashMap<usize, CoreTicks>,
    core_types: Vec<CoreType>,
}

impl Default for CpuSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSource {
    pub fn new() -> Self {
        Self::with_core_types(detect_core_types())
    }

    /// Core classes by logical index. Indices past the end are `Unknown`.
    pub fn with_core_types(core_types: Vec<CoreType>) -> Self {
        Self {
            history: RollingHistory::new(),
            previous: HashMap::new(),
            core_types,
        }
    }

    pub fn core_types(&self) -> &[CoreType] {
        &self.core_types
    }

    #[instrument(skip(self), fields(source = "cpu", operation = "sample"))]
    pub async fn sample(&mut self) -> CpuSnapshot {
        match run_blocking(linux::read_cpu_ticks).await {
            Ok(ticks) => self.ingest(ticks),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "read_cpu_ticks",
                    "CPU sample failed"
                );
                CpuSnapshot::empty()
            }
        }
    }

    /// Folds one reading into the source. Cores are matched to their previous reading
    /// and class by `id`; cores without a previous reading report 0%.
    pub fn ingest(&mut self, ticks: Vec<CoreTicks>) -> CpuSnapshot {
        let mut cores = Vec::with_capacity(ticks.len());
        let mut summed = CoreTicks::default();

        for current in &ticks {
            let id = current.id;
            let core_type = self
                .core_types
                .get(id)
                .copied()
                .unwrap_or(CoreType::Unknown);
            let usage = match self.previous.get(&id) {
                Some(prev) => {
                    let delta = current.delta(prev);
                    summed.user += delta.user;
                    summed.system += delta.system;
                    summed.idle += delta.idle;
                    summed.nice += delta.nice;
                    delta.usage_percent()
                }
                None => 0.0,
            };
            cores.push(CoreUsage {
                id,
                core_type,
                usage,
            });
        }

        self.previous = ticks.into_iter().map(|t| (t.id, t)).collect();
        let total_usage = summed.usage_percent();
        self.history.push(total_usage);

        CpuSnapshot {
            total_usage,
            cores,
            history: self.history.to_vec(),
        }
    }
}

/// Performance cores first, then efficiency cores; every core `Unknown` on
/// homogeneous machines.
fn detect_core_types() -> Vec<CoreType> {
    if let Some((performance, efficiency)) = linux::hybrid_core_counts() {
        tracing::debug!(performance, efficiency, "hybrid CPU topology detected");
        return std::iter::repeat_n(CoreType::Performance, performance)
            .chain(std::iter::repeat_n(CoreType::Efficiency, efficiency))
            .collect();
    }
    let sys =
        System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    vec![CoreType::Unknown; sys.cpus().len()]
}
