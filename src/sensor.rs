// src/sensor.rs

//! # Sensor Sources
//!
//! Sensors produce periodic estimates that are folded into the
//! [`FlightState`]. Each one is polled once per update cycle through a
//! readiness predicate; a sensor that is not ready is simply skipped.
//!
//! The two mandatory sources, [`Gyrometer`] and [`Quaternion`], read from the
//! [`Board`](crate::Board) the controller owns. Optional sources such as
//! rangefinders or optical-flow sensors implement [`Sensor`] and own their
//! hardware handle.

use crate::FlightState;

pub mod gyrometer;
pub use gyrometer::*;
pub mod quaternion;
pub use quaternion::*;

/// An optional estimate producer registered with
/// [`FlightController::add_sensor`](crate::FlightController::add_sensor).
pub trait Sensor {
    /// Whether a new estimate is available at `time_us`.
    fn ready(&mut self, time_us: u64) -> bool;

    /// Folds the latest estimate into `state`.
    fn modify_state(&mut self, state: &mut FlightState, time_us: u64);
}
