use crate::console::parse_override;
use crate::dynamics::SimulationState;
use crate::error::DecodeError;
use crate::protocol::{CommandStatus, InboundFrame};
use crate::vessel::VesselParameters;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Something an input task delivered to the integration task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Frame(InboundFrame),
    ConsoleLine(String),
}

/// Rudder angle in radians, split by where each part came from.
///
/// Each component holds its last value until replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RudderCommand {
    pub bus_component: f64,
    pub console_component: f64,
}

impl RudderCommand {
    pub fn commanded_angle(&self) -> f64 {
        self.bus_component + self.console_component
    }
}

/// Counters logged as a JSON record by the scheduler.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SimulatorStats {
    pub steps: u64,
    pub frames_accepted: u64,
    pub frames_rejected: u64,
    pub overrides_accepted: u64,
    pub overrides_ignored: u64,
}

/// The whole simulation context: vessel, hull state and current command.
///
/// Owned by the integration task and never shared.
#[derive(Debug)]
pub struct Simulator {
    vessel: VesselParameters,
    state: SimulationState,
    command: RudderCommand,
    stats: SimulatorStats,
}

impl Simulator {
    pub fn new(vessel: VesselParameters, now: Instant) -> Self {
        Self {
            vessel,
            state: SimulationState::new(now),
            command: RudderCommand::default(),
            stats: SimulatorStats::default(),
        }
    }

    pub fn apply(&mut self, input: Input) {
        match input {
            Input::Frame(frame) => {
                // Rejected frames are logged and dropped.
                let _ = self.handle_frame(&frame);
            }
            Input::ConsoleLine(line) => {
                self.handle_console_line(&line);
            }
        }
    }

    /// Decode a bus frame and take its rudder position as the bus component.
    pub fn handle_frame(&mut self, frame: &InboundFrame) -> Result<CommandStatus, DecodeError> {
        match CommandStatus::decode(frame) {
            Ok(status) => {
                self.command.bus_component = status.rudder_angle();
                self.stats.frames_accepted += 1;
                debug!(
                    "command status: rudder {}% heading {:.4} rad mode {:?} status {:#04x} slot {}",
                    status.rudder_percent,
                    status.heading_rad(),
                    status.auto_mode,
                    status.status_bits,
                    status.params_slot
                );
                Ok(status)
            }
            Err(e) => {
                self.stats.frames_rejected += 1;
                warn!("discarding frame {:#010x}: {}", frame.identifier, e);
                Err(e)
            }
        }
    }

    /// Returns whether the line replaced the console component.
    pub fn handle_console_line(&mut self, line: &str) -> bool {
        match parse_override(line) {
            Some(angle) => {
                self.command.console_component = angle;
                self.stats.overrides_accepted += 1;
                debug!("console override {} rad", angle);
                true
            }
            None => {
                self.stats.overrides_ignored += 1;
                debug!("ignoring console line {:?}", line);
                false
            }
        }
    }

    /// Integrate up to `now` with the current command; returns the new yaw
    /// rate.
    pub fn step(&mut self, now: Instant) -> f64 {
        self.state
            .advance(&self.vessel, now, self.command.commanded_angle());
        self.stats.steps += 1;
        self.state.yaw_rate()
    }

    pub fn yaw_rate(&self) -> f64 {
        self.state.yaw_rate()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn command(&self) -> &RudderCommand {
        &self.command
    }

    pub fn vessel(&self) -> &VesselParameters {
        &self.vessel
    }

    pub fn stats(&self) -> &SimulatorStats {
        &self.stats
    }
}
