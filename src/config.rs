//! Command line and startup configuration.

use crate::error::ConfigError;
use crate::scheduler::DEFAULT_PERIOD;
use crate::vessel::{HullConstants, VesselParameters};
use clap::{App, AppSettings, Arg, ArgMatches};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub interface: String,
    pub speed_knots: f64,
    pub vessel_file: Option<PathBuf>,
    pub period: Duration,
    pub log_level: Level,
}

pub fn build_cli() -> App<'static, 'static> {
    App::new("rudder-sim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rudder to yaw-rate emulator: reads autopilot rudder commands from CAN, prints yaw rate")
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(
            Arg::with_name("interface")
                .value_name("INTERFACE")
                .help("CAN interface carrying the autopilot command/status PGN")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("speed")
                .value_name("SPEED")
                .help("Boat speed through the water, in knots")
                .required(true)
                .index(2)
                .validator(|v| match v.parse::<f64>() {
                    Ok(speed) if speed.is_finite() => Ok(()),
                    _ => Err("Speed must be a number of knots".into()),
                }),
        )
        .arg(
            Arg::with_name("vessel")
                .long("vessel")
                .value_name("FILE")
                .help("JSON file overriding hull constants")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("period")
                .long("period-ms")
                .value_name("MS")
                .help("Longest wait between two integration steps")
                .takes_value(true)
                .default_value("100")
                .validator(|v| match v.parse::<u64>() {
                    Ok(ms) if ms > 0 => Ok(()),
                    _ => Err("Period must be a positive number of milliseconds".into()),
                }),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log every frame and console override"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Only log warnings and errors")
                .conflicts_with("verbose"),
        )
}

impl SimConfig {
    pub fn from_matches(matches: &ArgMatches<'_>) -> Result<Self, ConfigError> {
        let interface = matches.value_of("interface").unwrap_or_default().to_string();

        let speed = matches.value_of("speed").unwrap_or_default();
        let speed_knots = speed
            .parse::<f64>()
            .ok()
            .filter(|knots| knots.is_finite())
            .ok_or_else(|| ConfigError::InvalidSpeed(speed.to_string()))?;

        let period = match matches.value_of("period") {
            Some(ms) => match ms.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => return Err(ConfigError::InvalidPeriod(ms.to_string())),
            },
            None => DEFAULT_PERIOD,
        };

        let log_level = if matches.is_present("verbose") {
            Level::DEBUG
        } else if matches.is_present("quiet") {
            Level::WARN
        } else {
            Level::INFO
        };

        Ok(Self {
            interface,
            speed_knots,
            vessel_file: matches.value_of("vessel").map(PathBuf::from),
            period,
            log_level,
        })
    }

    /// Resolve hull constants and convert the speed factor.
    pub fn vessel(&self) -> Result<VesselParameters, ConfigError> {
        let hull = match &self.vessel_file {
            Some(path) => HullConstants::from_json_file(path)?,
            None => HullConstants::default(),
        };
        VesselParameters::from_knots(self.speed_knots, hull)
    }
}
