// src/mixer.rs

//! # Actuator Mixing
//!
//! The [`Mixer`] trait is the actuator sink the flight controller dispatches
//! to. [`QuadXMixer`] is a table-driven implementation for quadcopters in the
//! X configuration that writes normalized values to any [`Motors`] backend.

use crate::Demands;

/// Number of motors on a quadcopter.
pub const QUAD_MOTOR_COUNT: usize = 4;

/// Actuator sink driven by the flight controller.
pub trait Mixer {
    /// Converts demands into motor commands while armed.
    fn run_armed(&mut self, demands: &Demands);

    /// Drives the motors from the ground-station test values while disarmed.
    fn run_disarmed(&mut self);

    /// Stops every motor immediately.
    fn cut_motors(&mut self);

    /// Motor test values used by [`Mixer::run_disarmed`], normalized to `[0, 1]`.
    fn motors_disarmed_mut(&mut self) -> &mut [f32; QUAD_MOTOR_COUNT];
}

/// Low-level motor output, e.g. a PWM or DShot driver.
pub trait Motors {
    /// Sets motor `index` to `value` in `[0, 1]`.
    fn write_motor(&mut self, index: usize, value: f32);
}

/// Contribution of each demand axis to one motor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorMix {
    /// Throttle coefficient.
    pub throttle: f32,
    /// Roll coefficient.
    pub roll: f32,
    /// Pitch coefficient.
    pub pitch: f32,
    /// Yaw coefficient.
    pub yaw: f32,
}

impl MotorMix {
    const fn new(throttle: f32, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }
}

/// X-configuration table: right front, left rear, left front, right rear.
pub const QUAD_X_TABLE: [MotorMix; QUAD_MOTOR_COUNT] = [
    MotorMix::new(1.0, -1.0, 1.0, 1.0),
    MotorMix::new(1.0, 1.0, -1.0, 1.0),
    MotorMix::new(1.0, 1.0, 1.0, -1.0),
    MotorMix::new(1.0, -1.0, -1.0, -1.0),
];

/// Table mixer for an X-configuration quadcopter.
pub struct QuadXMixer<M: Motors> {
    motors: M,
    table: [MotorMix; QUAD_MOTOR_COUNT],
    motors_disarmed: [f32; QUAD_MOTOR_COUNT],
}

impl<M: Motors> QuadXMixer<M> {
    /// Creates a mixer using the standard X table.
    pub fn new(motors: M) -> Self {
        Self::with_table(motors, QUAD_X_TABLE)
    }

    /// Creates a mixer with a custom table, e.g. for reversed props.
    pub fn with_table(motors: M, table: [MotorMix; QUAD_MOTOR_COUNT]) -> Self {
        Self {
            motors,
            table,
            motors_disarmed: [0.0; QUAD_MOTOR_COUNT],
        }
    }

    /// The motor backend.
    pub fn motors(&self) -> &M {
        &self.motors
    }

    /// Computes motor values for `demands` without writing them.
    ///
    /// Throttle is mapped from `[-1, 1]` to `[0, 1]`. If any motor would
    /// exceed full power, all motors are lowered by the excess so attitude
    /// authority is kept at the cost of thrust; the result is then clamped.
    pub fn mix(&self, demands: &Demands) -> [f32; QUAD_MOTOR_COUNT] {
        let throttle = (demands.throttle + 1.0) / 2.0;

        let mut values = [0.0; QUAD_MOTOR_COUNT];
        for (value, mix) in values.iter_mut().zip(self.table.iter()) {
            *value = throttle * mix.throttle
                + demands.roll * mix.roll
                + demands.pitch * mix.pitch
                + demands.yaw * mix.yaw;
        }

        let max = values.iter().copied().fold(f32::MIN, f32::max);
        if max > 1.0 {
            for value in values.iter_mut() {
                *value -= max - 1.0;
            }
        }

        for value in values.iter_mut() {
            *value = value.clamp(0.0, 1.0);
        }

        values
    }
}

impl<M: Motors> Mixer for QuadXMixer<M> {
    fn run_armed(&mut self, demands: &Demands) {
        let values = self.mix(demands);
        for (index, value) in values.iter().enumerate() {
            self.motors.write_motor(index, *value);
        }
    }

    fn run_disarmed(&mut self) {
        for index in 0..QUAD_MOTOR_COUNT {
            let value = self.motors_disarmed[index].clamp(0.0, 1.0);
            self.motors.write_motor(index, value);
        }
    }

    fn cut_motors(&mut self) {
        for index in 0..QUAD_MOTOR_COUNT {
            self.motors.write_motor(index, 0.0);
        }
    }

    fn motors_disarmed_mut(&mut self) -> &mut [f32; QUAD_MOTOR_COUNT] {
        &mut self.motors_disarmed
    }
}
