// src/stage/rate.rs

//! # Rate Stabilization Stage
//!
//! The basic stabilization law: the scaled roll, pitch and yaw demands are
//! treated as angular-rate setpoints and a PID loop per axis drives the
//! measured angular velocity toward them. Hold stages are registered after
//! this one so they correct values that have already been rate-scaled.
//!
//! Integrators are held at zero while the throttle is down so the vehicle
//! does not wind up on the ground before takeoff.

use crate::pid::{rate_controller, RateControlData};
use crate::{ControlStage, Demands, FlightState};
use piddiy::PidController;

/// Configuration for the rate stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateStageConfig {
    /// Proportional gain for roll rate.
    pub kp_roll: f32,
    /// Integral gain for roll rate.
    pub ki_roll: f32,
    /// Derivative gain for roll rate.
    pub kd_roll: f32,
    /// Proportional gain for pitch rate.
    pub kp_pitch: f32,
    /// Integral gain for pitch rate.
    pub ki_pitch: f32,
    /// Derivative gain for pitch rate.
    pub kd_pitch: f32,
    /// Proportional gain for yaw rate.
    pub kp_yaw: f32,
    /// Integral gain for yaw rate.
    pub ki_yaw: f32,
    /// Derivative gain for yaw rate.
    pub kd_yaw: f32,
    /// Upper limit for the integral term to prevent windup.
    pub i_limit: f32,
    /// Scale factor applied to the PID output to match the demand range.
    pub scale: f32,
    /// Nominal period of the gyro update in seconds.
    pub dt: f32,
}

impl Default for RateStageConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RateStageConfig {
    /// Creates a pass-through configuration: unit proportional gain, no
    /// integral or derivative action, unit scale and a 1 kHz loop.
    ///
    /// ```
    /// use free_flight_core::{RateStage, RateStageConfig};
    ///
    /// let mut config = RateStageConfig::new();
    /// config.kp_roll = 0.15;
    /// config.ki_roll = 0.2;
    /// config.kd_roll = 0.0002;
    /// config.kp_pitch = config.kp_roll;
    /// config.ki_pitch = config.ki_roll;
    /// config.kd_pitch = config.kd_roll;
    /// config.i_limit = 25.0;
    ///
    /// let stage = RateStage::with_config(config);
    /// ```
    pub fn new() -> Self {
        Self {
            kp_roll: 1.0,
            ki_roll: 0.0,
            kd_roll: 0.0,
            kp_pitch: 1.0,
            ki_pitch: 0.0,
            kd_pitch: 0.0,
            kp_yaw: 1.0,
            ki_yaw: 0.0,
            kd_yaw: 0.0,
            i_limit: 1.0,
            scale: 1.0,
            dt: 0.001,
        }
    }
}

/// Per-axis angular-rate PID stage.
pub struct RateStage {
    roll_pid: PidController<f32, RateControlData>,
    pitch_pid: PidController<f32, RateControlData>,
    yaw_pid: PidController<f32, RateControlData>,
    i_limit: f32,
    scale: f32,
    dt: f32,
    low_throttle: bool,
}

impl Default for RateStage {
    fn default() -> Self {
        Self::new()
    }
}

impl RateStage {
    /// Creates a stage using the provided configuration.
    pub fn with_config(config: RateStageConfig) -> Self {
        Self {
            roll_pid: rate_controller(config.kp_roll, config.ki_roll, config.kd_roll),
            pitch_pid: rate_controller(config.kp_pitch, config.ki_pitch, config.kd_pitch),
            yaw_pid: rate_controller(config.kp_yaw, config.ki_yaw, config.kd_yaw),
            i_limit: config.i_limit,
            scale: config.scale,
            dt: config.dt,
            low_throttle: true,
        }
    }

    /// Creates a stage with default settings.
    pub fn new() -> Self {
        Self::with_config(RateStageConfig::new())
    }

    fn control_data(&self, measured: f32) -> RateControlData {
        RateControlData {
            measured,
            dt: self.dt,
            integral_limit: self.i_limit,
            reset_integral: self.low_throttle,
        }
    }
}

impl ControlStage for RateStage {
    fn modify_demands(&mut self, state: &FlightState, demands: &mut Demands) -> bool {
        let [roll_rate, pitch_rate, yaw_rate] = state.angular_velocities;
        let roll_data = self.control_data(roll_rate);
        let pitch_data = self.control_data(pitch_rate);
        let yaw_data = self.control_data(yaw_rate);

        self.roll_pid.set_point(demands.roll);
        self.pitch_pid.set_point(demands.pitch);
        self.yaw_pid.set_point(demands.yaw);

        demands.roll = self.scale * self.roll_pid.compute(roll_data);
        demands.pitch = self.scale * self.pitch_pid.compute(pitch_data);
        demands.yaw = self.scale * self.yaw_pid.compute(yaw_data);

        false
    }

    fn update_receiver(&mut self, _demands: &Demands, throttle_is_down: bool) {
        self.low_throttle = throttle_is_down;
    }
}
