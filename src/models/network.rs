// Network throughput models

use serde::{Deserialize, Serialize};

use crate::history::mean;

/// Below this rate a send/receive burst is never considered "active" (10 KB/s).
pub const ACTIVITY_FLOOR_BYTES_PER_SEC: f64 = 10_000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub bytes_sent_per_sec: f64,
    pub bytes_received_per_sec: f64,
    /// Cumulative counters summed over all non-loopback interfaces.
    pub total_bytes_sent: u64,
    pub total_bytes_received: u64,
    pub send_history: Vec<f64>,
    pub receive_history: Vec<f64>,
    /// Fastest link among the counted interfaces; 0 when unknown.
    pub link_speed_bits_per_sec: u64,
}

impl NetworkSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn link_speed_bytes_per_sec(&self) -> u64 {
        self.link_speed_bits_per_sec / 8
    }

    /// Rate as a percentage of link speed, clamped to 100; 0 when the link speed is unknown.
    pub fn percent_of_link(&self, bytes_per_sec: f64) -> f64 {
        let link = self.link_speed_bytes_per_sec();
        if link == 0 {
            return 0.0;
        }
        (bytes_per_sec / link as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn send_percent(&self) -> f64 {
        self.percent_of_link(self.bytes_sent_per_sec)
    }

    pub fn receive_percent(&self) -> f64 {
        self.percent_of_link(self.bytes_received_per_sec)
    }

    pub fn combined_percent(&self) -> f64 {
        self.percent_of_link(self.bytes_sent_per_sec + self.bytes_received_per_sec)
    }

    /// Larger of send/receive as a percentage of link speed.
    pub fn peak_percent(&self) -> f64 {
        self.percent_of_link(self.bytes_sent_per_sec.max(self.bytes_received_per_sec))
    }

    pub fn send_history_percent(&self) -> Vec<f64> {
        self.send_history
            .iter()
            .map(|&r| self.percent_of_link(r))
            .collect()
    }

    pub fn receive_history_percent(&self) -> Vec<f64> {
        self.receive_history
            .iter()
            .map(|&r| self.percent_of_link(r))
            .collect()
    }

    /// Elementwise max of the send and receive histories, as percentages of link speed.
    pub fn peak_history_percent(&self) -> Vec<f64> {
        self.send_history
            .iter()
            .zip(&self.receive_history)
            .map(|(&s, &r)| self.percent_of_link(s.max(r)))
            .collect()
    }

    /// Mean of the (send, receive) histories.
    pub fn rolling_mean(&self) -> (f64, f64) {
        (
            mean(self.send_history.iter().copied()),
            mean(self.receive_history.iter().copied()),
        )
    }

    /// True when the latest send or receive rate is above twice its rolling mean
    /// and above [`ACTIVITY_FLOOR_BYTES_PER_SEC`].
    pub fn is_active(&self) -> bool {
        let (Some(&last_send), Some(&last_receive)) =
            (self.send_history.last(), self.receive_history.last())
        else {
            return false;
        };
        let (send_mean, receive_mean) = self.rolling_mean();
        let above = |last: f64, mean: f64| last > mean * 2.0 && last > ACTIVITY_FLOOR_BYTES_PER_SEC;
        above(last_send, send_mean) || above(last_receive, receive_mean)
    }
}
