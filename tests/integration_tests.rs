use std::fs;
use std::path::PathBuf;

use gtfs_rt_harness::config::ConfigError;
use gtfs_rt_harness::harness::{self, Outcome};
use gtfs_rt_harness::logging::{DebugLevel, Logging};
use gtfs_rt_harness::sensor::DepartureSensor;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Runs the harness on a fixture with logs captured to a temp file.
fn run_logged(name: &str, level: DebugLevel) -> (Result<Outcome, ConfigError>, String) {
    let log_path = std::env::temp_dir().join(format!("gtfs_rt_harness_it_{name}.log"));
    let logging = Logging::new(level, Some(log_path.as_path())).unwrap();
    let outcome = logging.in_scope(|| harness::run(&fixture(name)));
    drop(logging);

    let log = fs::read_to_string(&log_path).unwrap();
    fs::remove_file(&log_path).unwrap();
    (outcome, log)
}

#[test]
fn test_minimal_config_builds_one_sensor() {
    let (outcome, log) = run_logged("minimal.yaml", DebugLevel::Info);

    let Outcome::Ready(platform) = outcome.unwrap() else {
        panic!("expected a valid configuration");
    };
    assert_eq!(platform.sensors.len(), 1);

    let sensor = &platform.sensors[0];
    assert_eq!(sensor.name(), "Home");
    assert_eq!(sensor.stop_id(), "123");
    assert_eq!(sensor.route(), "99");
    assert_eq!(sensor.direction_id(), "0");
    assert_eq!(sensor.service_type(), "Service");
    assert_eq!(sensor.icon(), "mdi:bus");

    assert!(log.contains("Input file configuration is valid."));
    assert!(log.contains("Adding sensor"));
    assert!(log.contains("stop_id=123"));
}

#[test]
fn test_sensors_follow_departure_order() {
    let (outcome, _) = run_logged("translink.yaml", DebugLevel::Debug);

    let Outcome::Ready(platform) = outcome.unwrap() else {
        panic!("expected a valid configuration");
    };
    let names: Vec<_> = platform.sensors.iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec![
            "Gympie North platform 1",
            "Cultural Centre to city",
            "Ferry from Hawthorne"
        ]
    );
    assert_eq!(platform.sensors[0].direction_id(), "1");
    assert_eq!(platform.sensors[1].icon(), "mdi:bus");
    assert_eq!(platform.sensors[2].service_type(), "Ferry");
    assert_eq!(platform.sensors[2].direction_id(), "0");
    assert_eq!(platform.data.route_delimiter(), Some("-"));
}

#[test]
fn test_missing_departures_is_logged_not_raised() {
    let (outcome, log) = run_logged("missing_departures.yaml", DebugLevel::Info);

    let outcome = outcome.unwrap();
    assert!(matches!(outcome, Outcome::Invalid(_)));
    assert!(outcome.sensors().is_empty());
    assert!(log.contains("Input file configuration invalid: Missing key: 'departures'"));
    assert!(!log.contains("Adding sensor"));
}

#[test]
fn test_missing_trip_update_url_is_invalid() {
    let (outcome, log) = run_logged("missing_trip_update_url.yaml", DebugLevel::Info);

    assert!(matches!(outcome.unwrap(), Outcome::Invalid(_)));
    assert!(log.contains("Missing key: 'trip_update_url'"));
}

#[test]
fn test_numeric_stop_id_is_invalid() {
    let (outcome, log) = run_logged("numeric_stop.yaml", DebugLevel::Info);

    let Outcome::Invalid(err) = outcome.unwrap() else {
        panic!("expected validation to fail");
    };
    assert_eq!(err.path(), "departures[0].stopid");
    assert!(log.contains("should be instance of 'str'"));
}

#[test]
fn test_application_tag_propagates() {
    let (outcome, log) = run_logged("python_tag.yaml", DebugLevel::Info);

    assert!(matches!(outcome, Err(ConfigError::UnsafeTag { .. })));
    assert!(!log.contains("Input file configuration invalid"));
}

#[test]
fn test_malformed_yaml_propagates() {
    let (outcome, _) = run_logged("malformed.yaml", DebugLevel::Info);
    assert!(matches!(outcome, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_missing_file_propagates() {
    let (outcome, _) = run_logged("no_such_file.yaml", DebugLevel::Info);
    assert!(matches!(outcome, Err(ConfigError::Read { .. })));
}
