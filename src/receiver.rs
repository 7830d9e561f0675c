// src/receiver.rs

//! Receiver collaborator: the pilot's radio link.
//!
//! Channel decoding, signal-loss timeouts and stick shaping belong to the
//! implementation. The controller only asks for fresh demands and the
//! switch positions.

use crate::Demands;

/// Half-width of the roll/pitch stick deadband around center.
pub const STICK_DEADBAND: f32 = 0.10;

/// Half-width of the throttle deadband around center used by altitude hold.
pub const THROTTLE_DEADBAND: f32 = 0.10;

/// Number of raw channels reported to the ground station.
pub const RAW_CHANNEL_COUNT: usize = 6;

/// Pilot input source.
pub trait Receiver {
    /// Starts the receiver. Called once when the controller is created.
    fn begin(&mut self) {}

    /// Polls for new demands.
    ///
    /// `yaw_angle_delta` is the current yaw relative to the heading latched
    /// at arming, for receivers that support headless flight. Returns `false`
    /// when no new frame has arrived since the last call.
    fn get_demands(&mut self, yaw_angle_delta: f32) -> bool;

    /// Most recent demands, as refreshed by [`Receiver::get_demands`].
    fn demands(&self) -> Demands;

    /// Gain applied to roll, pitch and yaw demands before the control stages.
    fn demand_scale(&self) -> f32;

    /// Whether the throttle stick is in its minimum band.
    fn throttle_is_down(&self) -> bool;

    /// Whether the link has been lost.
    fn lost_signal(&self) -> bool;

    /// Position of the multi-level auxiliary switch, zero being the lowest.
    fn aux_state(&self) -> u8;

    /// Position of the arming switch.
    fn arm_switch(&self) -> bool;

    /// Raw value of channel `index` (`0..RAW_CHANNEL_COUNT`).
    fn raw_channel(&self, index: usize) -> f32;
}
