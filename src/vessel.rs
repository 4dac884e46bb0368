use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Physical constants of the hull and rudder. All SI units.
///
/// Every field may be overridden from a JSON file; missing keys keep
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HullConstants {
    /// Turning moment of the hull about the steering axis.
    pub turning_moment: f64,
    /// Distance from the rudder to the turning axis (m).
    pub lever_arm: f64,
    /// Linear coefficient of angular water friction.
    pub linear_friction: f64,
    /// Quadratic coefficient of angular water friction.
    pub quadratic_friction: f64,
    /// Rudder blade area (m^2).
    pub rudder_area: f64,
    /// Water density (kg/m^3).
    pub water_density: f64,
}

impl Default for HullConstants {
    fn default() -> Self {
        Self {
            turning_moment: 5000.0,
            lever_arm: 3.0,
            linear_friction: 200.0,
            quadratic_friction: 1000.0,
            rudder_area: 0.5,
            water_density: 1000.0,
        }
    }
}

impl HullConstants {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let constants: Self = serde_json::from_str(json)?;
        constants.validate()?;
        Ok(constants)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::VesselFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Turning moment divides the step and the others scale torques, so
    /// all of them must be strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("turning_moment", self.turning_moment),
            ("lever_arm", self.lever_arm),
            ("linear_friction", self.linear_friction),
            ("quadratic_friction", self.quadratic_friction),
            ("rudder_area", self.rudder_area),
            ("water_density", self.water_density),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidConstant { name, value });
            }
        }
        Ok(())
    }
}

/// Everything the integrator needs to know about the boat. Built once at
/// startup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselParameters {
    /// Forward speed through the water (m/s).
    pub forward_speed: f64,
    pub hull: HullConstants,
}

impl VesselParameters {
    pub fn new(forward_speed: f64, hull: HullConstants) -> Self {
        Self { forward_speed, hull }
    }

    /// Build from a speed factor in knots, the unit the command line takes.
    ///
    /// The integrator squares the speed, so a speed whose square overflows
    /// is rejected along with non-finite input.
    pub fn from_knots(knots: f64, hull: HullConstants) -> Result<Self, ConfigError> {
        let speed = knots_to_mps(knots);
        if !(speed * speed).is_finite() {
            return Err(ConfigError::InvalidSpeed(knots.to_string()));
        }
        hull.validate()?;
        Ok(Self::new(speed, hull))
    }

    pub fn is_stationary(&self) -> bool {
        self.forward_speed == 0.0
    }
}

pub fn knots_to_mps(knots: f64) -> f64 {
    knots * METERS_PER_NAUTICAL_MILE / SECONDS_PER_HOUR
}
