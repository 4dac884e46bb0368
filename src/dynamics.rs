//! Yaw dynamics of a displacement hull steered by a single rudder.
//!
//! The model balances the torque the rudder produces in the flow it sees
//! against angular water friction. The flow angle at the rudder includes the
//! drift induced by the hull's own rotation, which makes the rudder lose
//! authority as the yaw rate builds up.

use crate::vessel::VesselParameters;
use tokio::time::Instant;

/// Torques acting about the steering axis at one instant (N*m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torques {
    pub rudder: f64,
    pub friction: f64,
}

impl Torques {
    pub fn net(&self) -> f64 {
        self.rudder + self.friction
    }
}

/// Torques for `yaw_rate` (rad/s) under `commanded_angle` (rad).
///
/// Undefined for a stationary vessel; callers check
/// [`VesselParameters::is_stationary`] first.
pub fn torques(vessel: &VesselParameters, yaw_rate: f64, commanded_angle: f64) -> Torques {
    let v = vessel.forward_speed;
    let hull = &vessel.hull;

    let radial_speed = v * yaw_rate;
    let resultant_speed = (radial_speed * radial_speed + v * v).sqrt();
    let drift_angle = (radial_speed / v).atan();

    let rudder = (commanded_angle - drift_angle).sin()
        * hull.rudder_area
        * resultant_speed
        * hull.water_density
        * hull.lever_arm;

    // Drag always opposes the current rotation.
    let magnitude =
        hull.linear_friction * yaw_rate.abs() + hull.quadratic_friction * yaw_rate * yaw_rate;
    let friction = if yaw_rate > 0.0 { -magnitude } else { magnitude };

    Torques { rudder, friction }
}

/// Net torque for `yaw_rate` under `commanded_angle`; zero for a stationary
/// vessel.
pub fn net_torque(vessel: &VesselParameters, yaw_rate: f64, commanded_angle: f64) -> f64 {
    if vessel.is_stationary() {
        return 0.0;
    }
    torques(vessel, yaw_rate, commanded_angle).net()
}

/// One explicit Euler step of the yaw rate over `elapsed_seconds`.
pub fn integrate(
    vessel: &VesselParameters,
    yaw_rate: f64,
    elapsed_seconds: f64,
    commanded_angle: f64,
) -> f64 {
    // A vessel with no way on cannot turn.
    if vessel.is_stationary() {
        return 0.0;
    }
    let acceleration = torques(vessel, yaw_rate, commanded_angle).net() / vessel.hull.turning_moment;
    yaw_rate + acceleration * elapsed_seconds
}

/// Continuous state of the simulated hull.
#[derive(Debug, Clone, Copy)]
pub struct SimulationState {
    yaw_rate: f64,
    last_update: Instant,
}

impl SimulationState {
    pub fn new(now: Instant) -> Self {
        Self {
            yaw_rate: 0.0,
            last_update: now,
        }
    }

    pub fn yaw_rate(&self) -> f64 {
        self.yaw_rate
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    /// Integrate from the previous update up to `now` and return the elapsed
    /// seconds used. A clock that went backwards yields zero elapsed time.
    pub fn advance(&mut self, vessel: &VesselParameters, now: Instant, commanded_angle: f64) -> f64 {
        let elapsed_seconds = now.saturating_duration_since(self.last_update).as_secs_f64();
        debug_assert!(elapsed_seconds >= 0.0, "negative elapsed time {elapsed_seconds}");

        self.yaw_rate = integrate(vessel, self.yaw_rate, elapsed_seconds, commanded_angle);
        self.last_update = now;
        elapsed_seconds
    }
}
