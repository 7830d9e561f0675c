// src/error.rs

//! Errors raised while bringing the flight controller up.
//!
//! The update cycle itself never fails; every check degrades to doing
//! nothing when its input is not ready. Only initialization can refuse.

use crate::board::BoardError;
use core::fmt;

/// Errors that prevent a [`FlightController`](crate::FlightController) from
/// being constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightError {
    /// The board reported a sensor or self-test failure.
    Board(BoardError),
}

impl From<BoardError> for FlightError {
    fn from(error: BoardError) -> Self {
        FlightError::Board(error)
    }
}

impl fmt::Display for FlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightError::Board(error) => write!(f, "Board initialization failed: {}", error),
        }
    }
}
