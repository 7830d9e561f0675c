// src/msp/parser.rs

//! MSP request dispatcher.
//!
//! [`MspParser`] consumes request bytes one at a time. Each complete and
//! valid request triggers exactly one [`MspHandler`] call; the response frame
//! is queued and drained by the caller with [`MspParser::read_byte`].
//! Incomplete, corrupt and unknown input never reaches the handler.

use super::frame::{
    encode_frame, floats_from_payload, floats_to_payload, Decoded, Direction, MspFrame,
    MspFrameDecoder,
};
use super::{MspCommand, MspError};
use crate::receiver::RAW_CHANNEL_COUNT;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// Navigation state reported in response to [`MspCommand::State`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateReport {
    /// Altitude in meters.
    pub altitude: f32,
    /// Vertical rate in meters per second.
    pub variometer: f32,
    /// Forward position in meters.
    pub position_x: f32,
    /// Rightward position in meters.
    pub position_y: f32,
    /// Heading in radians.
    pub heading: f32,
    /// Forward velocity in meters per second.
    pub velocity_forward: f32,
    /// Rightward velocity in meters per second.
    pub velocity_rightward: f32,
}

impl StateReport {
    fn to_array(self) -> [f32; 7] {
        [
            self.altitude,
            self.variometer,
            self.position_x,
            self.position_y,
            self.heading,
            self.velocity_forward,
            self.velocity_rightward,
        ]
    }

    /// Decodes a report from a response payload.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let [altitude, variometer, position_x, position_y, heading, velocity_forward, velocity_rightward] =
            floats_from_payload::<7>(payload)?;
        Some(Self {
            altitude,
            variometer,
            position_x,
            position_y,
            heading,
            velocity_forward,
            velocity_rightward,
        })
    }
}

/// Handlers invoked for decoded requests.
pub trait MspHandler {
    /// Reports the navigation state.
    fn handle_state_request(&mut self) -> StateReport;

    /// Arms (`true`) or disarms (`false`) the vehicle.
    fn handle_set_armed(&mut self, armed: bool);

    /// Reports the raw receiver channels.
    fn handle_rc_normal_request(&mut self) -> [f32; RAW_CHANNEL_COUNT];

    /// Reports roll, pitch and yaw in radians.
    fn handle_attitude_radians_request(&mut self) -> [f32; 3];

    /// Sets the disarmed motor test values.
    fn handle_set_motor_normal(&mut self, motors: [f32; 4]);
}

/// Counters for monitoring link quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserStats {
    /// Requests dispatched to the handler.
    pub messages_received: u32,
    /// Frames dropped for a checksum mismatch.
    pub checksum_errors: u32,
    /// Frames dropped for an unknown command ID.
    pub unknown_commands: u32,
    /// Frames dropped for a payload shorter than the command needs.
    pub malformed_payloads: u32,
}

/// Byte-at-a-time MSP request dispatcher with an outbound queue.
#[derive(Debug, Clone, Default)]
pub struct MspParser {
    decoder: MspFrameDecoder,
    outbound: VecDeque<u8>,
    stats: ParserStats,
}

impl MspParser {
    /// Creates an idle parser with an empty outbound queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser statistics.
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Feeds one byte, dispatching to `handler` if it completes a request.
    ///
    /// Returns `true` if the byte requested a reboot.
    pub fn parse<H: MspHandler>(&mut self, byte: u8, handler: &mut H) -> bool {
        match self.decoder.push(byte) {
            Decoded::Pending => false,
            Decoded::Reboot => true,
            Decoded::ChecksumMismatch { command } => {
                self.stats.checksum_errors = self.stats.checksum_errors.wrapping_add(1);
                log_warn!("MSP checksum mismatch on command {}", command);
                false
            }
            Decoded::Frame(frame) => {
                if frame.direction == Direction::Request {
                    self.dispatch(frame, handler);
                }
                false
            }
        }
    }

    /// Number of response bytes waiting to be sent.
    pub fn available_bytes(&self) -> usize {
        self.outbound.len()
    }

    /// Pops the next response byte.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.outbound.pop_front()
    }

    fn dispatch<H: MspHandler>(&mut self, frame: MspFrame, handler: &mut H) {
        match Self::handle(&frame, handler) {
            Ok(response) => {
                self.stats.messages_received = self.stats.messages_received.wrapping_add(1);
                self.respond(frame.command, &response);
            }
            Err(MspError::UnknownCommand(id)) => {
                self.stats.unknown_commands = self.stats.unknown_commands.wrapping_add(1);
                log_warn!("Unknown MSP command {}", id);
            }
            Err(_) => {
                self.stats.malformed_payloads = self.stats.malformed_payloads.wrapping_add(1);
                log_warn!("Malformed MSP payload for command {}", frame.command);
            }
        }
    }

    fn handle<H: MspHandler>(frame: &MspFrame, handler: &mut H) -> Result<Vec<u8>, MspError> {
        let command = MspCommand::try_from(frame.command)?;
        let payload = frame.payload.as_slice();

        let response = match command {
            MspCommand::State => floats_to_payload(&handler.handle_state_request().to_array()),
            MspCommand::RcNormal => floats_to_payload(&handler.handle_rc_normal_request()),
            MspCommand::AttitudeRadians => {
                floats_to_payload(&handler.handle_attitude_radians_request())
            }
            MspCommand::SetArmed => {
                let flag = payload
                    .first()
                    .ok_or_else(|| too_short(command, 1, payload.len()))?;
                handler.handle_set_armed(*flag != 0);
                Vec::new()
            }
            MspCommand::SetMotorNormal => {
                let motors = floats_from_payload::<4>(payload)
                    .ok_or_else(|| too_short(command, 16, payload.len()))?;
                handler.handle_set_motor_normal(motors);
                Vec::new()
            }
        };

        Ok(response)
    }

    fn respond(&mut self, command: u8, payload: &[u8]) {
        match encode_frame(Direction::Response, command, payload) {
            Ok(bytes) => self.outbound.extend(bytes),
            Err(_) => log_warn!("Dropping oversized MSP response to {}", command),
        }
    }
}

fn too_short(command: MspCommand, expected: usize, found: usize) -> MspError {
    MspError::PayloadTooShort {
        command: command.id(),
        expected,
        found,
    }
}
