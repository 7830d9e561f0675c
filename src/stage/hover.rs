// src/stage/hover.rs

//! Velocity-feedback hover stage.
//!
//! With the throttle stick centered the stage opposes vertical motion to hold
//! altitude; outside the deadband the pilot's throttle passes through scaled.
//! Measured horizontal velocity is always subtracted from pitch and roll to
//! cancel drift.

use crate::receiver::THROTTLE_DEADBAND;
use crate::{ControlStage, Demands, FlightState};
use num_traits::Float;

/// Configuration for the hover stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverConfig {
    /// Gain applied to the pilot's throttle outside the deadband.
    pub throttle_scale: f32,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            throttle_scale: 1.0,
        }
    }
}

/// Altitude and drift hold from velocity feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverStage {
    throttle_scale: f32,
}

impl HoverStage {
    /// Creates a hover stage using the provided configuration.
    pub fn with_config(config: HoverConfig) -> Self {
        Self {
            throttle_scale: config.throttle_scale,
        }
    }

    /// Creates a hover stage with the given throttle gain.
    pub fn new(throttle_scale: f32) -> Self {
        Self::with_config(HoverConfig { throttle_scale })
    }
}

impl ControlStage for HoverStage {
    fn modify_demands(&mut self, state: &FlightState, demands: &mut Demands) -> bool {
        demands.throttle = if Float::abs(demands.throttle) > THROTTLE_DEADBAND {
            self.throttle_scale * demands.throttle
        } else {
            -state.variometer
        };

        demands.pitch -= state.velocity_forward;
        demands.roll -= state.velocity_rightward;

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn moving_state() -> FlightState {
        FlightState {
            variometer: 0.4,
            velocity_forward: 0.2,
            velocity_rightward: -0.1,
            ..FlightState::new()
        }
    }

    /// Test that a centered throttle opposes the vertical rate.
    #[test]
    fn test_hover_inside_deadband_opposes_climb() {
        let mut stage = HoverStage::new(0.5);
        let mut demands = Demands::new(0.05, 0.0, 0.0, 0.0);

        let flash = stage.modify_demands(&moving_state(), &mut demands);

        assert!(!flash, "Hover should not request the LED.");
        assert!(value_close(-0.4, demands.throttle));
    }

    /// Test that throttle outside the deadband is scaled through.
    #[test]
    fn test_hover_outside_deadband_scales_throttle() {
        let mut stage = HoverStage::new(0.5);

        let mut demands = Demands::new(0.8, 0.0, 0.0, 0.0);
        stage.modify_demands(&moving_state(), &mut demands);
        assert!(value_close(0.4, demands.throttle));

        let mut demands = Demands::new(-0.6, 0.0, 0.0, 0.0);
        stage.modify_demands(&moving_state(), &mut demands);
        assert!(value_close(-0.3, demands.throttle));
    }

    /// Test that drift correction applies both inside and outside the deadband.
    #[test]
    fn test_hover_drift_correction_is_unconditional() {
        let mut stage = HoverStage::new(1.0);

        for throttle in [0.0, 0.9] {
            let mut demands = Demands::new(throttle, 0.3, 0.3, 0.1);
            stage.modify_demands(&moving_state(), &mut demands);

            assert!(value_close(0.1, demands.pitch), "Pitch minus forward velocity.");
            assert!(value_close(0.4, demands.roll), "Roll minus rightward velocity.");
            assert!(value_close(0.1, demands.yaw), "Yaw is untouched.");
        }
    }
}
