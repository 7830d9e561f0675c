// src/sensor/quaternion.rs

//! Mandatory orientation source backed by the board's attitude filter.
//!
//! The filter itself runs on the board; this type only converts the
//! quaternion it produces into Euler angles.

use crate::datatypes::{AXIS_PITCH, AXIS_ROLL, AXIS_YAW};
use crate::{Board, FlightState};
use core::f32::consts::PI;
use num_traits::Float;

/// Latest attitude quaternion `(w, x, y, z)` read from the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    quaternion: [f32; 4],
    last_ready_us: Option<u64>,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::new()
    }
}

impl Quaternion {
    /// Creates an orientation source holding the identity rotation.
    pub fn new() -> Self {
        Self {
            quaternion: [1.0, 0.0, 0.0, 0.0],
            last_ready_us: None,
        }
    }

    /// Polls the board for a new quaternion and latches it if present.
    pub fn ready<B: Board>(&mut self, board: &mut B, time_us: u64) -> bool {
        match board.get_quaternion() {
            Some(quaternion) => {
                self.quaternion = quaternion;
                self.last_ready_us = Some(time_us);
                true
            }
            None => false,
        }
    }

    /// Latched quaternion, for mounting correction before conversion.
    pub fn quaternion_mut(&mut self) -> &mut [f32; 4] {
        &mut self.quaternion
    }

    /// Time of the last successful read, if any.
    pub fn last_ready_us(&self) -> Option<u64> {
        self.last_ready_us
    }

    /// Writes roll, pitch and yaw (ZYX convention) into the state.
    ///
    /// Yaw is reported as a heading in `[0, 2π)`.
    pub fn modify_state(&self, state: &mut FlightState) {
        let [w, x, y, z] = self.quaternion;

        let roll = Float::atan2(2.0 * (w * x + y * z), 1.0 - 2.0 * (x * x + y * y));
        let pitch = Float::asin((2.0 * (w * y - x * z)).clamp(-1.0, 1.0));
        let mut yaw = Float::atan2(2.0 * (w * z + x * y), 1.0 - 2.0 * (y * y + z * z));

        if yaw < 0.0 {
            yaw += 2.0 * PI;
        }

        state.rotation[AXIS_ROLL] = roll;
        state.rotation[AXIS_PITCH] = pitch;
        state.rotation[AXIS_YAW] = yaw;
    }
}
