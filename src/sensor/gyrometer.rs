// src/sensor/gyrometer.rs

//! Mandatory angular-rate source backed by the board's gyro.

use crate::{Board, FlightState};

/// Latest gyro rates read from the board.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gyrometer {
    rates: [f32; 3],
    last_ready_us: Option<u64>,
}

impl Gyrometer {
    /// Creates a gyrometer that has not produced a reading yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls the board for new rates and latches them if present.
    pub fn ready<B: Board>(&mut self, board: &mut B, time_us: u64) -> bool {
        match board.get_gyrometer() {
            Some(rates) => {
                self.rates = rates;
                self.last_ready_us = Some(time_us);
                true
            }
            None => false,
        }
    }

    /// Latched rates, for mounting correction before they reach the state.
    pub fn rates_mut(&mut self) -> &mut [f32; 3] {
        &mut self.rates
    }

    /// Time of the last successful read, if any.
    pub fn last_ready_us(&self) -> Option<u64> {
        self.last_ready_us
    }

    /// Copies the latched rates into the state's angular velocities.
    pub fn modify_state(&self, state: &mut FlightState) {
        state.angular_velocities = self.rates;
    }
}
