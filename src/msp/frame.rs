// src/msp/frame.rs

//! MSP v1 framing: a byte-at-a-time decoder and a frame encoder.

use super::MspError;
use alloc::vec::Vec;

/// Frame preamble.
pub const MSP_PREAMBLE: [u8; 2] = *b"$M";

/// Byte that requests a reboot when received outside a frame.
pub const MSP_REBOOT_BYTE: u8 = b'R';

/// Direction marker of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ground station to flight controller (`'<'`).
    Request,
    /// Flight controller to ground station (`'>'`).
    Response,
}

impl Direction {
    /// Marker byte of this direction.
    pub fn marker(self) -> u8 {
        match self {
            Direction::Request => b'<',
            Direction::Response => b'>',
        }
    }

    fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'<' => Some(Direction::Request),
            b'>' => Some(Direction::Response),
            _ => None,
        }
    }
}

/// A complete, checksum-verified frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MspFrame {
    /// Direction marker.
    pub direction: Direction,
    /// Command ID.
    pub command: u8,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

/// Outcome of feeding one byte to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// More bytes are needed.
    Pending,
    /// A frame was completed.
    Frame(MspFrame),
    /// A reboot byte arrived between frames.
    Reboot,
    /// A frame was completed but its checksum did not match.
    ChecksumMismatch {
        /// Command ID of the rejected frame.
        command: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    Idle,
    PreambleM,
    Direction,
    Size,
    Command,
    Payload,
    Checksum,
}

/// Incremental MSP frame decoder.
///
/// State persists between calls, so a frame may arrive split across any
/// number of reads. Bytes that do not fit the framing are dropped and the
/// decoder resynchronizes on the next `'$'`.
#[derive(Debug, Clone)]
pub struct MspFrameDecoder {
    state: DecoderState,
    direction: Direction,
    size: u8,
    command: u8,
    checksum: u8,
    payload: Vec<u8>,
}

impl Default for MspFrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MspFrameDecoder {
    /// Creates an idle decoder.
    pub fn new() -> Self {
        Self {
            state: DecoderState::Idle,
            direction: Direction::Request,
            size: 0,
            command: 0,
            checksum: 0,
            payload: Vec::new(),
        }
    }

    /// Whether the decoder is between frames.
    pub fn is_idle(&self) -> bool {
        self.state == DecoderState::Idle
    }

    /// Feeds one byte.
    pub fn push(&mut self, byte: u8) -> Decoded {
        match self.state {
            DecoderState::Idle => {
                if byte == MSP_PREAMBLE[0] {
                    self.state = DecoderState::PreambleM;
                } else if byte == MSP_REBOOT_BYTE {
                    return Decoded::Reboot;
                }
            }
            DecoderState::PreambleM => {
                self.state = if byte == MSP_PREAMBLE[1] {
                    DecoderState::Direction
                } else {
                    DecoderState::Idle
                };
            }
            DecoderState::Direction => match Direction::from_marker(byte) {
                Some(direction) => {
                    self.direction = direction;
                    self.state = DecoderState::Size;
                }
                None => self.state = DecoderState::Idle,
            },
            DecoderState::Size => {
                self.size = byte;
                self.checksum = byte;
                self.payload.clear();
                self.state = DecoderState::Command;
            }
            DecoderState::Command => {
                self.command = byte;
                self.checksum ^= byte;
                self.state = if self.size == 0 {
                    DecoderState::Checksum
                } else {
                    DecoderState::Payload
                };
            }
            DecoderState::Payload => {
                self.payload.push(byte);
                self.checksum ^= byte;
                if self.payload.len() == usize::from(self.size) {
                    self.state = DecoderState::Checksum;
                }
            }
            DecoderState::Checksum => {
                self.state = DecoderState::Idle;
                if byte != self.checksum {
                    return Decoded::ChecksumMismatch {
                        command: self.command,
                    };
                }
                return Decoded::Frame(MspFrame {
                    direction: self.direction,
                    command: self.command,
                    payload: core::mem::take(&mut self.payload),
                });
            }
        }

        Decoded::Pending
    }
}

/// Encodes one frame.
pub fn encode_frame(
    direction: Direction,
    command: u8,
    payload: &[u8],
) -> Result<Vec<u8>, MspError> {
    let size = u8::try_from(payload.len()).map_err(|_| MspError::PayloadTooLarge(payload.len()))?;

    let mut bytes = Vec::with_capacity(payload.len() + 6);
    bytes.extend_from_slice(&MSP_PREAMBLE);
    bytes.push(direction.marker());
    bytes.push(size);
    bytes.push(command);
    bytes.extend_from_slice(payload);

    let checksum = payload.iter().fold(size ^ command, |crc, byte| crc ^ byte);
    bytes.push(checksum);

    Ok(bytes)
}

/// Serializes floats as consecutive little-endian `f32`s.
pub fn floats_to_payload(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Reads `N` little-endian `f32`s from the start of `payload`.
///
/// Returns `None` if the payload is too short.
pub fn floats_from_payload<const N: usize>(payload: &[u8]) -> Option<[f32; N]> {
    if payload.len() < N * 4 {
        return None;
    }

    let mut values = [0.0; N];
    for (value, chunk) in values.iter_mut().zip(payload.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Some(values)
}
