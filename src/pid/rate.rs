// src/pid/rate.rs

//! # Rate-Tracking PID Callback
//!
//! A compute callback for loops whose process variable is a rate: angular
//! velocity for attitude-rate stabilization, linear velocity for the inner
//! loop of position hold. The setpoint lives on the controller; the measured
//! rate arrives with each call.

use piddiy::PidController;

/// Control data for a rate-tracking PID callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateControlData {
    /// The measured rate, e.g. from a gyro or a velocity estimate.
    pub measured: f32,
    /// The time delta since the last computation. Must be non-zero.
    pub dt: f32,
    /// The maximum magnitude of the integral term.
    pub integral_limit: f32,
    /// Zeroes the integral term, e.g. while the throttle is down.
    pub reset_integral: bool,
}

/// Rate-tracking compute callback returning `(error, integral, derivative)`.
pub fn compute_rate(
    pid: &mut PidController<f32, RateControlData>,
    data: RateControlData,
) -> (f32, f32, f32) {
    let error = pid.set_point - data.measured;
    let integral = if data.reset_integral {
        0.0
    } else {
        (pid.integral + error * data.dt).clamp(-data.integral_limit, data.integral_limit)
    };
    let derivative = (error - pid.error) / data.dt;

    (error, integral, derivative)
}

/// Builds a controller wired to [`compute_rate`] with the given gains.
pub fn rate_controller(kp: f32, ki: f32, kd: f32) -> PidController<f32, RateControlData> {
    let mut pid = PidController::new();
    pid.compute_fn(compute_rate)
        .set_point(0.0)
        .kp(kp)
        .ki(ki)
        .kd(kd);
    pid
}

/// Clears the accumulated integral and the remembered error.
pub fn reset_rate_controller(pid: &mut PidController<f32, RateControlData>) {
    pid.integral = 0.0;
    pid.error = 0.0;
}
