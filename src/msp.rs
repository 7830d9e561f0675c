// src/msp.rs

//! # MSP Telemetry and Configuration
//!
//! The flight controller talks to ground stations over the MultiWii Serial
//! Protocol (MSP v1). Frames look like
//!
//! ```text
//! '$' 'M' dir size cmd payload[size] crc
//! ```
//!
//! where `dir` is `'<'` toward the flight controller and `'>'` from it, and
//! `crc` is the XOR of `size`, `cmd` and every payload byte. Numeric payloads
//! are little-endian `f32`. A lone `'R'` byte received between frames asks
//! the board to reboot.
//!
//! [`MspFrameDecoder`] and [`encode_frame`] implement the framing and are
//! public so a ground-station peer can use them too. [`MspParser`] decodes
//! requests one byte at a time, dispatches each complete request to an
//! [`MspHandler`] and queues the response bytes.

use core::fmt;

pub mod frame;
pub use frame::*;
pub mod parser;
pub use parser::*;

/// Commands understood by the flight controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MspCommand {
    /// Request the six raw receiver channels.
    RcNormal = 121,
    /// Request roll, pitch and yaw in radians.
    AttitudeRadians = 122,
    /// Request the navigation state report.
    State = 123,
    /// Set the four disarmed motor test values.
    SetMotorNormal = 215,
    /// Arm (non-zero flag) or disarm (zero flag).
    SetArmed = 216,
}

impl MspCommand {
    /// Wire identifier of the command.
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MspCommand {
    type Error = MspError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            121 => Ok(MspCommand::RcNormal),
            122 => Ok(MspCommand::AttitudeRadians),
            123 => Ok(MspCommand::State),
            215 => Ok(MspCommand::SetMotorNormal),
            216 => Ok(MspCommand::SetArmed),
            _ => Err(MspError::UnknownCommand(id)),
        }
    }
}

/// Errors raised by the MSP codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MspError {
    /// No handler exists for this command ID.
    UnknownCommand(u8),
    /// Payload does not fit the one-byte size field.
    PayloadTooLarge(usize),
    /// Payload is shorter than the command requires.
    PayloadTooShort {
        /// Command that carried the payload.
        command: u8,
        /// Bytes the command needs.
        expected: usize,
        /// Bytes actually received.
        found: usize,
    },
}

impl fmt::Display for MspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MspError::UnknownCommand(id) => write!(f, "Unknown MSP command {}", id),
            MspError::PayloadTooLarge(len) => {
                write!(f, "MSP payload of {} bytes exceeds 255", len)
            }
            MspError::PayloadTooShort {
                command,
                expected,
                found,
            } => write!(
                f,
                "MSP command {} needs {} payload bytes, got {}",
                command, expected, found
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn test_msp_command_ids_round_trip() {
        for command in [
            MspCommand::RcNormal,
            MspCommand::AttitudeRadians,
            MspCommand::State,
            MspCommand::SetMotorNormal,
            MspCommand::SetArmed,
        ] {
            assert_eq!(MspCommand::try_from(command.id()), Ok(command));
        }
        assert_eq!(
            MspCommand::try_from(100),
            Err(MspError::UnknownCommand(100))
        );
    }

    #[test]
    fn test_msp_error_display() {
        assert_eq!(
            format!("{}", MspError::UnknownCommand(7)),
            "Unknown MSP command 7"
        );
        assert_eq!(
            format!(
                "{}",
                MspError::PayloadTooShort {
                    command: 215,
                    expected: 16,
                    found: 4
                }
            ),
            "MSP command 215 needs 16 payload bytes, got 4"
        );
    }
}
