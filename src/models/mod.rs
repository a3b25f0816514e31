// Snapshot models published after every poll

mod cpu;
mod disk;
mod latency;
mod memory;
mod network;
mod system;

pub use cpu::{CoreType, CoreUsage, CpuSnapshot};
pub use disk::DiskSnapshot;
pub use latency::LatencySnapshot;
pub use memory::MemorySnapshot;
pub use network::{ACTIVITY_FLOOR_BYTES_PER_SEC, NetworkSnapshot};
pub use system::{MetricKind, SystemSnapshot};

pub(crate) const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
