use rudder_sim::config::{build_cli, SimConfig};
use rudder_sim::ConfigError;
use std::io::Write;
use std::time::Duration;
use tracing::Level;

fn parse(args: &[&str]) -> Result<SimConfig, ConfigError> {
    let matches = build_cli()
        .get_matches_from_safe(std::iter::once("rudder-sim").chain(args.iter().copied()))
        .expect("arguments should parse");
    SimConfig::from_matches(&matches)
}

#[test]
fn test_positional_arguments() {
    let config = parse(&["can0", "6.5"]).unwrap();
    assert_eq!(config.interface, "can0");
    assert_eq!(config.speed_knots, 6.5);
    assert_eq!(config.period, Duration::from_millis(100));
    assert_eq!(config.log_level, Level::INFO);
    assert!(config.vessel_file.is_none());
}

#[test]
fn test_speed_converted_to_mps() {
    let vessel = parse(&["can0", "10"]).unwrap().vessel().unwrap();
    assert!((vessel.forward_speed - 10.0 * 1852.0 / 3600.0).abs() < 1e-12);
}

#[test]
fn test_negative_speed_accepted() {
    let config = parse(&["vcan0", "-2"]).unwrap();
    assert_eq!(config.speed_knots, -2.0);
}

#[test]
fn test_missing_speed_rejected() {
    let result = build_cli().get_matches_from_safe(vec!["rudder-sim", "can0"]);
    assert!(result.is_err());
}

#[test]
fn test_non_numeric_speed_rejected() {
    let result = build_cli().get_matches_from_safe(vec!["rudder-sim", "can0", "fast"]);
    assert!(result.is_err());
}

#[test]
fn test_zero_period_rejected() {
    let result =
        build_cli().get_matches_from_safe(vec!["rudder-sim", "can0", "5", "--period-ms", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_verbosity_flags() {
    assert_eq!(parse(&["can0", "5", "-v"]).unwrap().log_level, Level::DEBUG);
    assert_eq!(parse(&["can0", "5", "--quiet"]).unwrap().log_level, Level::WARN);
    assert!(build_cli()
        .get_matches_from_safe(vec!["rudder-sim", "can0", "5", "-v", "-q"])
        .is_err());
}

#[test]
fn test_vessel_file_overrides_constants() {
    let path = std::env::temp_dir().join(format!("rudder-sim-vessel-{}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, r#"{{"rudder_area": 0.75, "turning_moment": 8000}}"#).unwrap();
    drop(file);

    let config = parse(&["can0", "5", "--vessel", path.to_str().unwrap()]).unwrap();
    let vessel = config.vessel().unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(vessel.hull.rudder_area, 0.75);
    assert_eq!(vessel.hull.turning_moment, 8000.0);
    assert_eq!(vessel.hull.lever_arm, 3.0);
}

#[test]
fn test_missing_vessel_file_is_config_error() {
    let config = parse(&["can0", "5", "--vessel", "/nonexistent/rudder-sim/hull.json"]).unwrap();
    assert!(matches!(config.vessel(), Err(ConfigError::VesselFile { .. })));
}

#[test]
fn test_overflowing_speed_is_config_error() {
    let config = parse(&["can0", "1e306"]).unwrap();
    assert!(matches!(config.vessel(), Err(ConfigError::InvalidSpeed(_))));
}
