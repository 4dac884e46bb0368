//! # Rudder Emulator
//!
//! A real-time stand-in for a boat's rudder and yaw dynamics, used to exercise
//! an autopilot without a hull in the water.
//!
//! ## Features
//!
//! - **Bus input**: decodes the autopilot's command/status PGN from SocketCAN
//! - **Console override**: an operator bias angle typed on stdin
//! - **Nonlinear yaw model**: rudder torque with rotation-induced drift
//!   against linear and quadratic water friction
//! - **Bounded cadence**: one integration step at least every 100 ms
//! - **Streaming output**: yaw rate in rad/s, one line per step
//!
//! ## Quick Start
//!
//! ```rust
//! use rudder_sim::dynamics;
//! use rudder_sim::vessel::{HullConstants, VesselParameters};
//!
//! let vessel = VesselParameters::from_knots(10.0, HullConstants::default()).unwrap();
//!
//! // 0.1 rad of rudder for one 100 ms step, starting straight
//! let yaw_rate = dynamics::integrate(&vessel, 0.0, 0.1, 0.1);
//! assert!(yaw_rate > 0.0);
//! ```
//!
//! ## Architecture
//!
//! - [`scheduler`] - Bounded-wait loop driving one step per wake
//! - [`simulator`] - Simulation context: vessel, state and rudder command
//! - [`dynamics`] - Yaw-rate integrator
//! - [`protocol`] - Command/status frame decoding
//! - [`console`] - Console override parsing and reader task
//! - [`transport`] - SocketCAN frame source
//! - [`emitter`] - Yaw-rate output stream

#![warn(clippy::all)]

pub mod config;
pub mod console;
pub mod dynamics;
pub mod emitter;
pub mod error;
pub mod protocol;
pub mod scheduler;
pub mod simulator;
pub mod transport;
pub mod vessel;

// Re-export main public types for convenience
pub use error::{ConfigError, DecodeError, SimError, TransportError};
pub use scheduler::Scheduler;
pub use simulator::{Input, RudderCommand, Simulator};
pub use vessel::{HullConstants, VesselParameters};
