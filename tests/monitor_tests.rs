// Orchestrator tests. Every source except the ones under test is disabled and the
// latency probe targets a closed local port, so nothing here touches the network.

mod common;

use common::only;
use menustats::models::{MetricKind, SystemSnapshot};
use menustats::monitor::Monitor;
use std::time::Duration;

#[tokio::test]
async fn test_poll_once_while_idle_publishes() {
    let mut monitor = Monitor::new(only(&[]));
    let mut rx = monitor.subscribe();
    assert_eq!(monitor.snapshot().sequence, 0);

    let snapshot = monitor.poll_once().await;
    assert_eq!(snapshot.sequence, 1);
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().sequence, 1);

    let second = monitor.poll_once().await;
    assert_eq!(second.sequence, 2);
    assert!(second.timestamp >= snapshot.timestamp);
}

#[tokio::test]
async fn test_disabled_metrics_publish_empty() {
    let mut monitor = Monitor::new(only(&[MetricKind::Memory]));
    let snapshot = monitor.poll_once().await;
    let empty = SystemSnapshot::empty();
    assert_eq!(snapshot.cpu, empty.cpu);
    assert_eq!(snapshot.network, empty.network);
    assert_eq!(snapshot.disk, empty.disk);
    assert_eq!(snapshot.latency, empty.latency);
    assert!(snapshot.memory.total_bytes > 0);
}

#[tokio::test]
async fn test_start_twice_runs_single_loop() {
    let mut monitor = Monitor::new(only(&[]));
    monitor.start(Duration::from_millis(100)).await;
    monitor.start(Duration::from_millis(100)).await;
    assert!(monitor.is_running());

    tokio::time::sleep(Duration::from_millis(450)).await;
    monitor.stop().await;

    // One loop ticks at 0, 100, 200, 300, 400 ms; two would publish about twice that.
    let published = monitor.snapshot().sequence;
    assert!(published >= 3, "expected at least 3 polls, got {published}");
    assert!(published <= 7, "expected a single loop, got {published} polls");
}

#[tokio::test]
async fn test_no_publication_after_stop() {
    let mut monitor = Monitor::new(only(&[]));
    monitor.start(Duration::from_millis(20)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    monitor.stop().await;
    assert!(!monitor.is_running());

    let mut rx = monitor.subscribe();
    let at_stop = monitor.snapshot().sequence;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(monitor.snapshot().sequence, at_stop);
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_stop_when_idle_is_noop() {
    let mut monitor = Monitor::new(only(&[]));
    monitor.stop().await;
    assert!(!monitor.is_running());
    assert_eq!(monitor.snapshot().sequence, 0);
}

#[tokio::test]
async fn test_sequence_continues_across_restart() {
    let mut monitor = Monitor::new(only(&[]));
    monitor.poll_once().await;
    monitor.start(Duration::from_millis(20)).await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    monitor.stop().await;
    let after_first = monitor.snapshot().sequence;
    assert!(after_first > 1);

    monitor.start(Duration::from_millis(20)).await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    monitor.stop().await;
    assert!(monitor.snapshot().sequence > after_first);
}

#[tokio::test]
async fn test_poll_once_while_running_returns_latest() {
    let mut monitor = Monitor::new(only(&[]));
    monitor.start(Duration::from_millis(500)).await;
    // The first tick fires immediately.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let latest = monitor.snapshot().sequence;
    assert_eq!(monitor.poll_once().await.sequence, latest);
    monitor.stop().await;
}

#[tokio::test]
async fn test_set_update_interval_updates_config() {
    let monitor = Monitor::new(only(&[]));
    monitor.set_update_interval(Duration::from_millis(750));
    assert_eq!(monitor.config().monitoring.update_interval_ms, 750);

    let mut config = monitor.config();
    config.metrics.cpu = true;
    monitor.update_config(config);
    assert!(monitor.config().metrics.cpu);
}

#[tokio::test]
async fn test_interval_change_applies_while_running() {
    let mut monitor = Monitor::new(only(&[]));
    monitor.start(Duration::from_millis(400)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    monitor.set_update_interval(Duration::from_millis(20));

    // The pending 400 ms tick still fires once, then polls come every 20 ms.
    tokio::time::sleep(Duration::from_millis(600)).await;
    monitor.stop().await;
    assert!(monitor.snapshot().sequence >= 5);
}

#[tokio::test]
async fn test_network_inactive_before_any_poll() {
    let monitor = Monitor::new(only(&[]));
    assert!(!monitor.is_network_active());
}

#[tokio::test]
async fn test_zero_interval_config_keeps_loop_polling() {
    let mut monitor = Monitor::new(only(&[]));
    monitor.start(Duration::from_millis(20)).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    let mut config = monitor.config();
    config.monitoring.update_interval_ms = 0;
    monitor.update_config(config);

    tokio::time::sleep(Duration::from_millis(60)).await;
    let before = monitor.snapshot().sequence;
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(monitor.snapshot().sequence > before);

    // The loop is still alive, so stop hands the sources back and a restart keeps counting.
    monitor.stop().await;
    let at_stop = monitor.snapshot().sequence;
    monitor.poll_once().await;
    assert_eq!(monitor.snapshot().sequence, at_stop + 1);
}
