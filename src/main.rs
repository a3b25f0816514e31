use anyhow::Result;
use menustats::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!("starting {}", version::banner());
    let app_config = config::AppConfig::load()?;
    let period = app_config.update_interval();

    let mut monitor = monitor::Monitor::new(app_config);
    let mut snapshots = monitor.subscribe();
    monitor.start(period).await;

    let shutdown = async {
        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate(),
            ) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                report(&snapshot, &monitor.config());
            }
        }
    }

    monitor.stop().await;
    Ok(())
}

fn report(snapshot: &models::SystemSnapshot, config: &config::AppConfig) {
    tracing::info!(
        sequence = snapshot.sequence,
        cpu = format_args!("{:.1}%", snapshot.cpu.total_usage),
        memory = format_args!(
            "{:.1}% ({})",
            snapshot.memory.usage_percent(),
            format::format_compact(snapshot.memory.used_bytes)
        ),
        net_up = %format::format_rate(snapshot.network.bytes_sent_per_sec, None),
        net_down = %format::format_rate(snapshot.network.bytes_received_per_sec, None),
        net_active = snapshot.network.is_active(),
        disk = format_args!("{:.1}%", snapshot.disk.usage_percent()),
        latency = %snapshot.latency.formatted(),
        "metrics"
    );

    for kind in detector::active_alerts(snapshot, config) {
        tracing::warn!(metric = %kind, sequence = snapshot.sequence, "metric flagged");
    }

    match serde_json::to_string(snapshot) {
        Ok(json) => tracing::trace!(snapshot = %json, "snapshot json"),
        Err(e) => tracing::debug!(error = %e, "snapshot serialization failed"),
    }
}
