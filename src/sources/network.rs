// Network throughput: cumulative interface counters turned into per-second rates.

use super::{linux, lock, run_blocking};
use crate::history::{RollingHistory, mean};
use crate::models::NetworkSnapshot;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::Networks;
use tracing::instrument;

/// Counters summed over every non-loopback interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkReading {
    pub total_sent: u64,
    pub total_received: u64,
    /// Fastest link among the counted interfaces, bits/sec; 0 when unknown.
    pub link_speed_bits_per_sec: u64,
}

/// `(current - previous) / elapsed_secs`. A counter that went backwards (reset or
/// wraparound) yields 0, as does a non-positive interval.
pub fn rate_per_sec(previous: u64, current: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    current.saturating_sub(previous) as f64 / elapsed_secs
}

struct PreviousCounters {
    sent: u64,
    received: u64,
    at: Instant,
}

pub struct NetworkSource {
    networks: Arc<Mutex<Networks>>,
    send_history: RollingHistory<f64>,
    receive_history: RollingHistory<f64>,
    previous: Option<PreviousCounters>,
}

impl Default for NetworkSource {
    fn default() -> Self {
        Self::new()
    }
}

fn is_loopback(name: &str) -> bool {
    name == "lo" || name.starts_with("lo0")
}

impl NetworkSource {
    pub fn new() -> Self {
        Self {
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            send_history: RollingHistory::new(),
            receive_history: RollingHistory::new(),
            previous: None,
        }
    }

    #[instrument(skip(self), fields(source = "network", operation = "sample"))]
    pub async fn sample(&mut self) -> NetworkSnapshot {
        let networks = self.networks.clone();
        let reading = run_blocking(move || {
            let mut networks = lock(&networks, "sysinfo networks")?;
            networks.refresh(true);
            let reading = networks
                .list()
                .iter()
                .filter(|(name, _)| !is_loopback(name))
                .fold(NetworkReading::default(), |mut acc, (name, data)| {
                    acc.total_sent = acc.total_sent.saturating_add(data.total_transmitted());
                    acc.total_received = acc.total_received.saturating_add(data.total_received());
                    acc.link_speed_bits_per_sec = acc
                        .link_speed_bits_per_sec
                        .max(linux::get_interface_speed(name));
                    acc
                });
            Ok(reading)
        })
        .await;

        match reading {
            Ok(reading) => self.ingest(reading, Instant::now()),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "read_interfaces",
                    "network sample failed"
                );
                NetworkSnapshot::empty()
            }
        }
    }

    /// Folds one reading taken at `now` into the source. The first reading has no
    /// baseline and reports a rate of 0.
    pub fn ingest(&mut self, reading: NetworkReading, now: Instant) -> NetworkSnapshot {
        let (sent_rate, received_rate) = match &self.previous {
            Some(prev) => {
                let elapsed = now.saturating_duration_since(prev.at).as_secs_f64();
                (
                    rate_per_sec(prev.sent, reading.total_sent, elapsed),
                    rate_per_sec(prev.received, reading.total_received, elapsed),
                )
            }
            None => (0.0, 0.0),
        };

        self.previous = Some(PreviousCounters {
            sent: reading.total_sent,
            received: reading.total_received,
            at: now,
        });
        self.send_history.push(sent_rate);
        self.receive_history.push(received_rate);

        NetworkSnapshot {
            bytes_sent_per_sec: sent_rate,
            bytes_received_per_sec: received_rate,
            total_bytes_sent: reading.total_sent,
            total_bytes_received: reading.total_received,
            send_history: self.send_history.to_vec(),
            receive_history: self.receive_history.to_vec(),
            link_speed_bits_per_sec: reading.link_speed_bits_per_sec,
        }
    }

    /// Mean of the (send, receive) rate histories.
    pub fn rolling_mean(&self) -> (f64, f64) {
        (
            mean(self.send_history.iter().copied()),
            mean(self.receive_history.iter().copied()),
        )
    }

    /// See [`NetworkSnapshot::is_active`].
    pub fn is_active(&self) -> bool {
        NetworkSnapshot {
            send_history: self.send_history.to_vec(),
            receive_history: self.receive_history.to_vec(),
            ..NetworkSnapshot::empty()
        }
        .is_active()
    }
}
