// src/stage/poshold.rs

//! # Position Hold Stage
//!
//! Holds the horizontal position the vehicle had when the pilot let go of the
//! pitch and roll sticks. The pilot's raw sticks arrive through
//! [`ControlStage::update_receiver`] on every receiver frame, active or not.
//! Both sticks entering the deadband arms a capture, and the setpoint is
//! latched on the next cycle the stage runs. Centering the sticks while the
//! stage is switched off therefore captures a fresh setpoint as soon as it is
//! switched back on.
//!
//! While the sticks are centered a cascaded law replaces the pitch and roll
//! demands: the position error times the position gain gives a target
//! velocity, and a rate PID on the velocity error gives the demand. With the
//! integral and derivative gains at zero this is the plain proportional
//! cascade `posr_p * (pos_p * (setpoint - position) - velocity)`.

use crate::pid::{rate_controller, reset_rate_controller, RateControlData};
use crate::receiver::STICK_DEADBAND;
use crate::{ControlStage, Demands, FlightState};
use num_traits::Float;
use piddiy::PidController;

/// Configuration for the position hold stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionHoldConfig {
    /// Position error to target velocity gain.
    pub pos_p: f32,
    /// Proportional gain of the velocity loop.
    pub posr_p: f32,
    /// Integral gain of the velocity loop.
    pub posr_i: f32,
    /// Derivative gain of the velocity loop.
    pub posr_d: f32,
    /// Upper limit for the velocity-loop integral term.
    pub i_limit: f32,
    /// Nominal period of the gyro update in seconds.
    pub dt: f32,
}

impl PositionHoldConfig {
    /// Creates a proportional-only configuration with the given gains.
    pub fn new(pos_p: f32, posr_p: f32) -> Self {
        Self {
            pos_p,
            posr_p,
            posr_i: 0.0,
            posr_d: 0.0,
            i_limit: 1.0,
            dt: 0.001,
        }
    }
}

/// Position hold from a latched `(x, y)` setpoint.
pub struct PositionHoldStage {
    pos_p: f32,
    i_limit: f32,
    dt: f32,
    setpoint_x: f32,
    setpoint_y: f32,
    sticks_in_band: bool,
    capture_pending: bool,
    forward_pid: PidController<f32, RateControlData>,
    rightward_pid: PidController<f32, RateControlData>,
}

impl PositionHoldStage {
    /// Creates a stage using the provided configuration.
    pub fn with_config(config: PositionHoldConfig) -> Self {
        Self {
            pos_p: config.pos_p,
            i_limit: config.i_limit,
            dt: config.dt,
            setpoint_x: 0.0,
            setpoint_y: 0.0,
            sticks_in_band: false,
            capture_pending: false,
            forward_pid: rate_controller(config.posr_p, config.posr_i, config.posr_d),
            rightward_pid: rate_controller(config.posr_p, config.posr_i, config.posr_d),
        }
    }

    /// Creates a proportional-only stage.
    pub fn new(pos_p: f32, posr_p: f32) -> Self {
        Self::with_config(PositionHoldConfig::new(pos_p, posr_p))
    }

    /// The latched position setpoint `(x, y)`.
    pub fn setpoint(&self) -> (f32, f32) {
        (self.setpoint_x, self.setpoint_y)
    }

    fn in_band(demand: f32) -> bool {
        Float::abs(demand) < STICK_DEADBAND
    }

    fn correction(
        pid: &mut PidController<f32, RateControlData>,
        target_velocity: f32,
        velocity: f32,
        dt: f32,
        i_limit: f32,
    ) -> f32 {
        pid.set_point(target_velocity);
        pid.compute(RateControlData {
            measured: velocity,
            dt,
            integral_limit: i_limit,
            reset_integral: false,
        })
    }
}

impl ControlStage for PositionHoldStage {
    fn modify_demands(&mut self, state: &FlightState, demands: &mut Demands) -> bool {
        if !self.sticks_in_band {
            return true;
        }

        if self.capture_pending {
            self.capture_pending = false;
            self.setpoint_x = state.position_x;
            self.setpoint_y = state.position_y;
            reset_rate_controller(&mut self.forward_pid);
            reset_rate_controller(&mut self.rightward_pid);
            log_debug!(
                "position hold setpoint captured at ({}, {})",
                self.setpoint_x,
                self.setpoint_y
            );
        }

        let target_forward = self.pos_p * (self.setpoint_x - state.position_x);
        let target_rightward = self.pos_p * (self.setpoint_y - state.position_y);

        demands.pitch = Self::correction(
            &mut self.forward_pid,
            target_forward,
            state.velocity_forward,
            self.dt,
            self.i_limit,
        );
        demands.roll = Self::correction(
            &mut self.rightward_pid,
            target_rightward,
            state.velocity_rightward,
            self.dt,
            self.i_limit,
        );

        true
    }

    fn update_receiver(&mut self, demands: &Demands, _throttle_is_down: bool) {
        let in_band = Self::in_band(demands.pitch) && Self::in_band(demands.roll);
        if !in_band {
            self.capture_pending = false;
        } else if !self.sticks_in_band {
            self.capture_pending = true;
        }
        self.sticks_in_band = in_band;
    }

    fn should_flash_led(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn state_at(x: f32, y: f32, forward: f32, rightward: f32) -> FlightState {
        FlightState {
            position_x: x,
            position_y: y,
            velocity_forward: forward,
            velocity_rightward: rightward,
            ..FlightState::new()
        }
    }

    /// Feeds a receiver frame with the given pitch and roll sticks.
    fn sticks(stage: &mut PositionHoldStage, pitch: f32, roll: f32) {
        stage.update_receiver(&Demands::new(0.0, roll, pitch, 0.0), false);
    }

    /// Test that pilot demands outside the deadband pass through unmodified.
    #[test]
    fn test_poshold_outside_deadband_passes_through() {
        let mut stage = PositionHoldStage::new(1.0, 0.5);
        sticks(&mut stage, 0.4, 0.0);
        let mut demands = Demands::new(0.2, 0.0, 0.4, 0.1);

        let flash = stage.modify_demands(&state_at(3.0, 4.0, 1.0, 1.0), &mut demands);

        assert!(flash, "Position hold always requests the LED.");
        assert!(value_close(0.4, demands.pitch));
        assert!(value_close(0.0, demands.roll));
        assert!(value_close(0.2, demands.throttle));
        assert!(value_close(0.1, demands.yaw));
    }

    /// Test that the setpoint is captured once, on entering the deadband.
    #[test]
    fn test_poshold_setpoint_capture_is_edge_triggered() {
        let mut stage = PositionHoldStage::new(1.0, 0.5);

        sticks(&mut stage, 0.5, 0.5);
        stage.modify_demands(&state_at(1.0, 1.0, 0.0, 0.0), &mut Demands::default());
        assert_eq!(stage.setpoint(), (0.0, 0.0), "No capture outside the deadband.");

        sticks(&mut stage, 0.0, 0.0);
        stage.modify_demands(&state_at(2.0, 3.0, 0.0, 0.0), &mut Demands::default());
        assert_eq!(stage.setpoint(), (2.0, 3.0), "Capture on entering the deadband.");

        sticks(&mut stage, 0.05, 0.0);
        stage.modify_demands(&state_at(2.5, 3.5, 0.0, 0.0), &mut Demands::default());
        assert_eq!(stage.setpoint(), (2.0, 3.0), "No recapture inside the deadband.");

        sticks(&mut stage, 0.5, 0.0);
        stage.modify_demands(&state_at(5.0, 5.0, 0.0, 0.0), &mut Demands::default());
        sticks(&mut stage, 0.0, 0.0);
        stage.modify_demands(&state_at(6.0, 7.0, 0.0, 0.0), &mut Demands::default());
        assert_eq!(stage.setpoint(), (6.0, 7.0), "Capture again after leaving.");
    }

    /// Test that sticks centered while the stage is not running still
    /// capture on its next run.
    #[test]
    fn test_poshold_capture_waits_for_next_run() {
        let mut stage = PositionHoldStage::new(1.0, 0.5);
        sticks(&mut stage, 0.0, 0.0);
        stage.modify_demands(&state_at(1.0, 1.0, 0.0, 0.0), &mut Demands::default());

        // Stage switched off: the pilot flies away and centers again.
        sticks(&mut stage, 0.8, 0.0);
        sticks(&mut stage, 0.0, 0.0);
        sticks(&mut stage, 0.0, 0.0);

        let mut demands = Demands::default();
        stage.modify_demands(&state_at(8.0, 9.0, 0.0, 0.0), &mut demands);
        assert_eq!(stage.setpoint(), (8.0, 9.0));
        assert!(value_close(0.0, demands.pitch));
        assert!(value_close(0.0, demands.roll));
    }

    /// Test that a capture is dropped if the sticks leave the deadband
    /// before the stage runs.
    #[test]
    fn test_poshold_capture_cancelled_by_stick_input() {
        let mut stage = PositionHoldStage::new(1.0, 0.5);
        sticks(&mut stage, 0.0, 0.0);
        sticks(&mut stage, 0.0, 0.6);

        stage.modify_demands(&state_at(4.0, 4.0, 0.0, 0.0), &mut Demands::default());
        assert_eq!(stage.setpoint(), (0.0, 0.0));
    }

    /// Test the cascaded proportional correction inside the deadband.
    #[test]
    fn test_poshold_cascaded_correction() {
        let mut stage = PositionHoldStage::new(2.0, 0.5);
        sticks(&mut stage, 0.0, 0.0);
        stage.modify_demands(&state_at(1.0, 1.0, 0.0, 0.0), &mut Demands::default());

        // Drifted 0.5 forward and 0.25 left while moving.
        let mut demands = Demands::new(0.0, 0.05, -0.05, 0.0);
        stage.modify_demands(&state_at(1.5, 0.75, 0.2, -0.1), &mut demands);

        // forward: 0.5 * (2.0 * (1.0 - 1.5) - 0.2) = -0.6
        // rightward: 0.5 * (2.0 * (1.0 - 0.75) + 0.1) = 0.3
        assert!(value_close(-0.6, demands.pitch));
        assert!(value_close(0.3, demands.roll));
    }

    /// Test that holding still at the setpoint demands nothing.
    #[test]
    fn test_poshold_at_setpoint_is_quiet() {
        let mut stage = PositionHoldStage::new(2.0, 0.5);
        let state = state_at(4.0, -2.0, 0.0, 0.0);
        sticks(&mut stage, 0.0, 0.0);

        for _ in 0..3 {
            let mut demands = Demands::default();
            stage.modify_demands(&state, &mut demands);
            assert!(value_close(0.0, demands.pitch));
            assert!(value_close(0.0, demands.roll));
        }
    }
}
