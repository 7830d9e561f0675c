// src/stage.rs

//! # Control Stages
//!
//! A control stage is one law in the demand-modification pipeline. The
//! flight controller seeds a [`Demands`] vector from the receiver on every
//! gyro update and hands it to each active stage in registration order, so a
//! stage sees the values already modified by the stages registered before it.
//!
//! Each registered stage carries an auxiliary-switch threshold. A stage runs
//! only while the receiver's aux switch reports a level at or above that
//! threshold, so the low positions enable a subset of what the high ones do.

use crate::{Demands, FlightState};
use alloc::boxed::Box;

pub mod hover;
pub use hover::*;
pub mod poshold;
pub use poshold::*;
pub mod rate;
pub use rate::*;

/// A pluggable control law.
pub trait ControlStage {
    /// Modifies `demands` in place from the current `state`.
    ///
    /// Returns `true` to request an LED indication this cycle.
    fn modify_demands(&mut self, state: &FlightState, demands: &mut Demands) -> bool;

    /// Receives the raw pilot demands whenever the receiver delivers a new
    /// frame, whether or not the stage is currently active.
    fn update_receiver(&mut self, _demands: &Demands, _throttle_is_down: bool) {}

    /// Whether the stage wants the LED flashing whenever it is active.
    fn should_flash_led(&self) -> bool {
        false
    }
}

/// A stage together with the aux level it was registered at.
pub(crate) struct RegisteredStage {
    pub(crate) stage: Box<dyn ControlStage>,
    pub(crate) aux_state: u8,
}

/// Runs every stage whose threshold is at or below `aux_state`, in order.
///
/// Returns whether any active stage asked for the LED.
pub(crate) fn run_stages(
    stages: &mut [RegisteredStage],
    aux_state: u8,
    state: &FlightState,
    demands: &mut Demands,
) -> bool {
    let mut should_flash = false;

    for registered in stages.iter_mut() {
        if registered.aux_state <= aux_state {
            if registered.stage.modify_demands(state, demands) {
                should_flash = true;
            }
            if registered.stage.should_flash_led() {
                should_flash = true;
            }
        }
    }

    should_flash
}
