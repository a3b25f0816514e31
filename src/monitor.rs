// Polling orchestrator: fans out to every source on each tick and publishes one
// merged snapshot. The loop task owns the sources and hands them back on stop.

use crate::config::AppConfig;
use crate::models::{
    CpuSnapshot, DiskSnapshot, LatencySnapshot, MemorySnapshot, NetworkSnapshot, SystemSnapshot,
};
use crate::sources::{CpuSource, DiskSource, LatencySource, MemorySource, NetworkSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, interval_at};

/// The five metric sources. Each keeps its own history and previous-sample state.
pub struct Sources {
    pub cpu: CpuSource,
    pub memory: MemorySource,
    pub network: NetworkSource,
    pub disk: DiskSource,
    pub latency: LatencySource,
}

impl Sources {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            cpu: CpuSource::new(),
            memory: MemorySource::new(),
            network: NetworkSource::new(),
            disk: DiskSource::new(),
            latency: LatencySource::new(config.latency.clone()),
        }
    }

    /// Samples every enabled source concurrently. Disabled metrics come back empty.
    pub async fn poll(&mut self, config: &AppConfig, sequence: u64) -> SystemSnapshot {
        let Sources {
            cpu,
            memory,
            network,
            disk,
            latency,
        } = self;
        let toggles = &config.metrics;
        if latency.target() != &config.latency {
            latency.set_target(config.latency.clone());
        }

        let (cpu, memory, network, disk, latency) = tokio::join!(
            async move {
                if toggles.cpu {
                    cpu.sample().await
                } else {
                    CpuSnapshot::empty()
                }
            },
            async move {
                if toggles.memory {
                    memory.sample().await
                } else {
                    MemorySnapshot::empty()
                }
            },
            async move {
                if toggles.network {
                    network.sample().await
                } else {
                    NetworkSnapshot::empty()
                }
            },
            async move {
                if toggles.disk {
                    disk.sample().await
                } else {
                    DiskSnapshot::empty()
                }
            },
            async move {
                if toggles.latency {
                    latency.sample().await
                } else {
                    LatencySnapshot::empty()
                }
            },
        );

        SystemSnapshot {
            sequence,
            timestamp: unix_millis(),
            cpu,
            memory,
            network,
            disk,
            latency,
        }
    }
}

fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "get_timestamp",
                "system time error"
            );
            0
        })
}

struct RunningLoop {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<Sources>,
}

/// Periodic driver for the sources.
///
/// Idle until [`Monitor::start`]; `start` while running restarts the loop, so there
/// is never more than one. Readers only ever see whole snapshots: each poll is
/// published with a single `watch` replace.
pub struct Monitor {
    config_tx: watch::Sender<AppConfig>,
    snapshot_tx: watch::Sender<Arc<SystemSnapshot>>,
    /// Parked here while idle; moved into the loop task while running.
    sources: Option<Sources>,
    running: Option<RunningLoop>,
}

impl Monitor {
    pub fn new(config: AppConfig) -> Self {
        let sources = Sources::new(&config);
        Self::with_sources(config, sources)
    }

    pub fn with_sources(config: AppConfig, sources: Sources) -> Self {
        let (config_tx, _) = watch::channel(config);
        let (snapshot_tx, _) = watch::channel(Arc::new(SystemSnapshot::empty()));
        Self {
            config_tx,
            snapshot_tx,
            sources: Some(sources),
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<SystemSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver notified after every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SystemSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub fn config(&self) -> AppConfig {
        self.config_tx.borrow().clone()
    }

    /// Read by the loop at the next poll; a new interval applies from the next tick.
    pub fn update_config(&self, config: AppConfig) {
        self.config_tx.send_replace(config);
    }

    pub fn set_update_interval(&self, period: Duration) {
        self.config_tx.send_modify(|c| {
            c.monitoring.update_interval_ms = period.as_millis().max(1) as u64;
        });
    }

    /// Whether network traffic is currently bursting above its rolling mean.
    pub fn is_network_active(&self) -> bool {
        self.snapshot_tx.borrow().network.is_active()
    }

    /// Starts polling every `period`; restarts the loop if one is running.
    pub async fn start(&mut self, period: Duration) {
        self.stop().await;
        self.set_update_interval(period);

        let sources = self
            .sources
            .take()
            .unwrap_or_else(|| Sources::new(&self.config_tx.borrow()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = spawn(
            sources,
            self.config_tx.subscribe(),
            self.snapshot_tx.clone(),
            shutdown_rx,
        );
        self.running = Some(RunningLoop {
            shutdown_tx,
            handle,
        });
        tracing::info!(interval_ms = period.as_millis() as u64, "monitor started");
    }

    /// Stops the loop and waits for it to exit. A poll in flight completes first.
    /// No snapshot is published after this returns.
    pub async fn stop(&mut self) {
        let Some(RunningLoop {
            shutdown_tx,
            handle,
        }) = self.running.take()
        else {
            return;
        };
        let _ = shutdown_tx.send(());
        match handle.await {
            Ok(sources) => self.sources = Some(sources),
            Err(e) => {
                tracing::warn!(error = %e, operation = "stop", "monitor loop ended abnormally");
            }
        }
        tracing::info!("monitor stopped");
    }

    /// Runs a single poll and publishes it. Only valid while idle; while running the
    /// loop owns the sources and the latest snapshot is returned instead.
    pub async fn poll_once(&mut self) -> Arc<SystemSnapshot> {
        let Some(sources) = self.sources.as_mut() else {
            return self.snapshot();
        };
        let config = self.config_tx.borrow().clone();
        let sequence = self.snapshot_tx.borrow().sequence + 1;
        let snapshot = Arc::new(sources.poll(&config, sequence).await);
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown_tx.send(());
        }
    }
}

fn spawn(
    mut sources: Sources,
    mut config_rx: watch::Receiver<AppConfig>,
    snapshot_tx: watch::Sender<Arc<SystemSnapshot>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> JoinHandle<Sources> {
    tokio::spawn(async move {
        let mut period = config_rx.borrow_and_update().update_interval();
        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sequence = snapshot_tx.borrow().sequence;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    tracing::debug!("monitor loop shutting down");
                    break;
                }
                _ = tick.tick() => {
                    let config = config_rx.borrow_and_update().clone();
                    sequence += 1;
                    let snapshot = sources.poll(&config, sequence).await;
                    tracing::debug!(
                        sequence,
                        cpu = snapshot.cpu.total_usage,
                        memory = snapshot.memory.usage_percent(),
                        "snapshot published"
                    );
                    snapshot_tx.send_replace(Arc::new(snapshot));

                    let next = config_rx.borrow().update_interval();
                    if next != period {
                        tracing::info!(
                            interval_ms = next.as_millis() as u64,
                            "update interval changed"
                        );
                        period = next;
                        tick = interval_at(tokio::time::Instant::now() + period, period);
                        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    }
                }
            }
        }
        sources
    })
}
