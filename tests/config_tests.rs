// Config loading and validation tests

use menustats::config::AppConfig;
use menustats::detector::DetectionMethod;
use std::time::Duration;

const VALID_CONFIG: &str = r#"
[monitoring]
update_interval_ms = 1000

[metrics]
cpu = true
memory = true
network = false
disk = true
latency = true

[thresholds.cpu]
green_max = 40.0
yellow_max = 70.0

[detection]
enabled = true
method = "outliers"
std_dev_multiplier = 3.0
min_history_count = 15

[latency]
host = "example.com"
port = 443
timeout_ms = 2000
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.monitoring.update_interval_ms, 1000);
    assert_eq!(config.update_interval(), Duration::from_secs(1));
    assert!(!config.metrics.network);
    assert_eq!(config.thresholds.cpu.green_max, 40.0);
    assert_eq!(config.thresholds.cpu.yellow_max, 70.0);
    assert_eq!(config.detection.method, DetectionMethod::Outliers);
    assert_eq!(config.detection.std_dev_multiplier, 3.0);
    assert_eq!(config.detection.min_history_count, 15);
    assert_eq!(config.latency.host, "example.com");
    assert_eq!(config.latency.port, 443);
    assert_eq!(config.latency.timeout(), Duration::from_secs(2));
}

#[test]
fn test_config_defaults_when_omitted() {
    let config = AppConfig::load_from_str("").expect("empty config is valid");
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.monitoring.update_interval_ms, 2000);
    assert!(config.metrics.cpu && config.metrics.latency);
    assert_eq!(config.thresholds.memory.green_max, 60.0);
    assert_eq!(config.thresholds.memory.yellow_max, 85.0);
    assert_eq!(config.thresholds.disk.green_max, 70.0);
    assert_eq!(config.thresholds.latency.yellow_max, 100.0);
    assert_eq!(config.detection.method, DetectionMethod::Both);
    assert_eq!(config.latency.host, "google.com");
    assert_eq!(config.latency.port, 80);
    assert_eq!(config.latency.timeout_ms, 5000);
}

#[test]
fn test_config_partial_threshold_section_keeps_other_defaults() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    assert_eq!(config.thresholds.network.green_max, 50.0);
    assert_eq!(config.thresholds.network.yellow_max, 80.0);
}

#[test]
fn test_policy_from_detection_config() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    let policy = config.detection.policy();
    assert_eq!(policy.method, DetectionMethod::Outliers);
    assert_eq!(policy.std_dev_multiplier, 3.0);
    assert_eq!(policy.min_history_count, 15);
}

#[test]
fn test_config_validation_rejects_zero_interval() {
    let bad = VALID_CONFIG.replace("update_interval_ms = 1000", "update_interval_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("update_interval_ms"));
}

#[test]
fn test_config_validation_rejects_unordered_thresholds() {
    let bad = VALID_CONFIG.replace("yellow_max = 70.0", "yellow_max = 30.0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("thresholds.cpu"));
}

#[test]
fn test_config_validation_rejects_multiplier_out_of_range() {
    let bad = VALID_CONFIG.replace("std_dev_multiplier = 3.0", "std_dev_multiplier = 9.0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("std_dev_multiplier"));
}

#[test]
fn test_config_validation_rejects_min_history_out_of_range() {
    let bad = VALID_CONFIG.replace("min_history_count = 15", "min_history_count = 2");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("min_history_count"));
}

#[test]
fn test_config_validation_rejects_empty_latency_host() {
    let bad = VALID_CONFIG.replace("host = \"example.com\"", "host = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("latency.host"));
}

#[test]
fn test_config_validation_rejects_zero_latency_port() {
    let bad = VALID_CONFIG.replace("port = 443", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("latency.port"));
}

#[test]
fn test_config_validation_rejects_zero_latency_timeout() {
    let bad = VALID_CONFIG.replace("timeout_ms = 2000", "timeout_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("latency.timeout_ms"));
}

#[test]
fn test_config_validation_rejects_unknown_method() {
    let bad = VALID_CONFIG.replace("method = \"outliers\"", "method = \"sometimes\"");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

// Both env-var cases live in one test so they cannot race on CONFIG_FILE.
#[test]
fn test_config_load_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("menustats.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let from_file = AppConfig::load();

    let missing = dir.path().join("absent.toml");
    unsafe { std::env::set_var("CONFIG_FILE", missing.to_str().unwrap()) };
    let from_missing = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };

    let config = from_file.expect("load from CONFIG_FILE");
    assert_eq!(config.monitoring.update_interval_ms, 1000);
    assert_eq!(config.latency.host, "example.com");
    assert_eq!(from_missing.expect("missing file yields defaults"), AppConfig::default());
}

#[test]
fn test_update_interval_never_zero() {
    let mut config = AppConfig::default();
    config.monitoring.update_interval_ms = 0;
    assert_eq!(config.update_interval(), Duration::from_millis(1));
}
