// src/board.rs

//! # Board Collaborator
//!
//! The [`Board`] trait gathers everything the flight controller needs from a
//! particular hardware target: a monotonic clock, the raw attitude and gyro
//! estimates of the IMU, hooks to correct for how the IMU is mounted, status
//! LEDs, a serial byte channel for MSP and a way to reboot.
//!
//! Hardware state such as serial port handles and timer counters lives in
//! the implementing type. The controller owns the board for its lifetime and
//! holds no global mutable state of its own.

use core::fmt;

/// Errors a board may report while checking its hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// A sensor answered with an unexpected identification register.
    SensorId {
        /// ID the driver expected.
        expected: u8,
        /// ID actually read back.
        found: u8,
    },
    /// A sensor failed its built-in self-test.
    SelfTest(&'static str),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::SensorId { expected, found } => write!(
                f,
                "Unexpected sensor ID 0x{:02X} (expected 0x{:02X})",
                found, expected
            ),
            BoardError::SelfTest(reason) => write!(f, "Self-test failed: {}", reason),
        }
    }
}

/// Hardware target abstraction used by the flight controller.
pub trait Board {
    /// Microseconds since an arbitrary fixed epoch. Must be monotonic.
    fn micros(&self) -> u64;

    /// Checks the hardware. Called once before the controller starts.
    ///
    /// Any error is fatal: the controller refuses to initialize.
    fn self_test(&mut self) -> Result<(), BoardError> {
        Ok(())
    }

    /// Returns a new attitude quaternion `(w, x, y, z)` if one is ready.
    fn get_quaternion(&mut self) -> Option<[f32; 4]>;

    /// Returns new gyro rates `(x, y, z)` in radians per second if ready.
    fn get_gyrometer(&mut self) -> Option<[f32; 3]>;

    /// Rotates a quaternion to account for IMU orientation on the frame.
    fn adjust_quaternion(&mut self, _quaternion: &mut [f32; 4]) {}

    /// Rotates gyro rates to account for IMU orientation on the frame.
    fn adjust_gyrometer(&mut self, _rates: &mut [f32; 3]) {}

    /// Trims roll and pitch to compensate for a slightly skewed IMU mount.
    fn adjust_roll_and_pitch(&mut self, _roll: &mut f32, _pitch: &mut f32) {}

    /// Shows whether the vehicle is armed.
    fn show_armed_status(&mut self, armed: bool);

    /// Flashes the status LED while `on` is set.
    fn flash_led(&mut self, on: bool);

    /// Number of bytes waiting on the serial channel.
    fn serial_available_bytes(&mut self) -> usize;

    /// Reads one byte from the serial channel.
    fn serial_read_byte(&mut self) -> u8;

    /// Writes one byte to the serial channel.
    fn serial_write_byte(&mut self, byte: u8);

    /// Reboots the board, typically into its bootloader.
    fn reboot(&mut self);
}
