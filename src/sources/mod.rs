// Metric sources. Each owns its private sampling state; only the monitor loop calls `sample`.

mod cpu;
mod disk;
mod latency;
mod linux;
mod memory;
mod network;

pub use cpu::{CoreTicks, CpuSource};
pub use disk::DiskSource;
pub use latency::{LatencySource, probe_latency};
pub use memory::{MemoryReading, MemorySource, VmPages};
pub use network::{NetworkReading, NetworkSource, rate_per_sec};

use crate::error::SampleError;
use std::sync::{Arc, Mutex, MutexGuard};

/// Runs a blocking OS read off the async workers.
async fn run_blocking<T, F>(read: F) -> Result<T, SampleError>
where
    F: FnOnce() -> Result<T, SampleError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(read).await?
}

fn lock<'a, T>(
    handle: &'a Arc<Mutex<T>>,
    what: &'static str,
) -> Result<MutexGuard<'a, T>, SampleError> {
    handle.lock().map_err(|_| SampleError::LockPoisoned(what))
}
