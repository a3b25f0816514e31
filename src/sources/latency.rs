// Round-trip latency via a TCP handshake, raced against a timeout.

use crate::config::LatencyConfig;
use crate::history::RollingHistory;
use crate::models::LatencySnapshot;
use crate::race;
use futures_util::FutureExt;
use std::time::Instant;
use tokio::net::TcpStream;
use tracing::instrument;

pub struct LatencySource {
    history: RollingHistory<f64>,
    target: LatencyConfig,
}

impl Default for LatencySource {
    fn default() -> Self {
        Self::new(LatencyConfig::default())
    }
}

impl LatencySource {
    pub fn new(target: LatencyConfig) -> Self {
        Self {
            history: RollingHistory::new(),
            target,
        }
    }

    pub fn target(&self) -> &LatencyConfig {
        &self.target
    }

    /// Takes effect on the next probe.
    pub fn set_target(&mut self, target: LatencyConfig) {
        self.target = target;
    }

    #[instrument(skip(self), fields(source = "latency", host = %self.target.host, port = self.target.port))]
    pub async fn sample(&mut self) -> LatencySnapshot {
        let measured = probe_latency(&self.target).await;
        self.record(measured)
    }

    /// Only successful measurements enter the history.
    pub fn record(&mut self, latency_ms: Option<f64>) -> LatencySnapshot {
        if let Some(ms) = latency_ms {
            self.history.push(ms);
        }
        LatencySnapshot {
            latency_ms,
            history: self.history.to_vec(),
        }
    }
}

/// Time to complete a TCP handshake with the target, in ms. `None` on
/// connection failure or when the timeout wins the race.
pub async fn probe_latency(target: &LatencyConfig) -> Option<f64> {
    let host = target.host.clone();
    let port = target.port;
    let timeout = target.timeout();
    let started = Instant::now();

    let connect = async move {
        match TcpStream::connect((host.as_str(), port)).await {
            Ok(_stream) => Some(started.elapsed().as_secs_f64() * 1000.0),
            Err(e) => {
                tracing::debug!(error = %e, operation = "probe_latency", "latency probe failed");
                None
            }
        }
    }
    .boxed();
    let deadline = async move {
        tokio::time::sleep(timeout).await;
        tracing::debug!(operation = "probe_latency", "latency probe timed out");
        None
    }
    .boxed();

    race::first_of(vec![connect, deadline]).await.flatten()
}
