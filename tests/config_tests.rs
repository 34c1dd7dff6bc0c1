use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use fairline::config::EngineConfig;
use fairline::error::{ConfigError, Error};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn write_temp_config(contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let suffix = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!("fairline-config-test-{nanos}-{suffix}.toml"));
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = EngineConfig::load("/nonexistent/fairline.toml").expect("defaults");
    assert_eq!(config.min_data_points, 4);
    assert_eq!(config.synthetic_under_price, -119);
}

#[test]
fn config_overrides_engine_tuning() {
    let toml = r#"
min_data_points = 6
ev_cap_percent = 25

[refresh]
enabled = false
interval_secs = 120
cooldown_secs = 30

[logging]
level = "debug"
format = "json"
"#;

    let path = write_temp_config(toml);
    let config = EngineConfig::load(&path).expect("load config");
    let _ = fs::remove_file(&path);

    assert_eq!(config.min_data_points, 6);
    assert_eq!(config.ev_cap_percent.to_string(), "25");
    assert!(!config.refresh.enabled);
    assert_eq!(config.refresh.interval_secs, 120);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn config_rejects_zero_minimum_data_points() {
    let toml = "min_data_points = 0\n";

    let path = write_temp_config(toml);
    let result = EngineConfig::load(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "min_data_points",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid min_data_points error, got {err}"),
        Ok(_) => panic!("Expected zero minimum to be rejected"),
    }
}

#[test]
fn config_rejects_positive_synthetic_under_price() {
    let toml = "synthetic_under_price = 119\n";

    let path = write_temp_config(toml);
    let result = EngineConfig::load(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "synthetic_under_price",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid synthetic price error, got {err}"),
        Ok(_) => panic!("Expected a favorite-priced synthetic vig to be required"),
    }
}

#[test]
fn config_rejects_malformed_toml() {
    let path = write_temp_config("min_data_points = \"four\"\n");
    let result = EngineConfig::load(&path);
    let _ = fs::remove_file(&path);

    match result {
        Err(Error::Config(ConfigError::Parse(_))) => {}
        other => panic!("Expected a parse error, got {other:?}"),
    }
}
