// src/controller.rs

//! # Flight Controller
//!
//! The orchestrator that ties the collaborators together. Each call to
//! [`FlightController::update`] runs one cooperative, non-blocking cycle:
//!
//! 1. Check the receiver for signal loss and new demands, and run the
//!    arm/disarm state machine.
//! 2. If the board has a new attitude quaternion, fold it into the state and
//!    service MSP over the serial channel.
//! 3. If the board has new gyro rates, fold them into the state, run the
//!    control-stage pipeline and drive the mixer.
//! 4. Poll the optional sensors.
//!
//! Every check is skipped silently when its data is not ready. Nothing in
//! the cycle blocks or fails.
//!
//! ## Arming
//!
//! The vehicle arms from the arming switch only when all of these hold at
//! once: the switch has been seen off at least once since startup, the
//! throttle is down, failsafe is not active, and roll and pitch are within
//! [`FlightControllerConfig::max_arming_angle_degrees`]. It disarms when the
//! switch goes off, when a ground station sends a disarm command, or when the
//! receiver loses signal, which also latches failsafe and cuts the motors.

use crate::datatypes::{deg2rad, AXIS_PITCH, AXIS_ROLL, AXIS_YAW};
use crate::msp::{MspHandler, MspParser, ParserStats, StateReport};
use crate::receiver::RAW_CHANNEL_COUNT;
use crate::sensor::{Gyrometer, Quaternion};
use crate::stage::{run_stages, RegisteredStage};
use crate::{Board, ControlStage, Demands, FlightError, FlightState, Mixer, Receiver, Sensor};
use alloc::boxed::Box;
use alloc::vec::Vec;
use num_traits::Float;

/// Configuration for the flight controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightControllerConfig {
    /// Roll and pitch must both be within this many degrees of level to arm.
    pub max_arming_angle_degrees: f32,
    /// Starts the controller armed. Only meant for simulators.
    pub start_armed: bool,
}

impl Default for FlightControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FlightControllerConfig {
    /// Creates the default configuration: a 25 degree arming bound, starting
    /// disarmed.
    pub fn new() -> Self {
        Self {
            max_arming_angle_degrees: 25.0,
            start_armed: false,
        }
    }
}

/// The flight-control orchestrator.
pub struct FlightController<B: Board, R: Receiver, M: Mixer> {
    board: B,
    receiver: R,
    mixer: M,

    max_arming_angle: f32,

    state: FlightState,
    gyrometer: Gyrometer,
    quaternion: Quaternion,

    stages: Vec<RegisteredStage>,
    sensors: Vec<Box<dyn Sensor>>,

    parser: MspParser,

    safe_to_arm: bool,
    failsafe: bool,
    yaw_reference: f32,
}

impl<B: Board, R: Receiver, M: Mixer> FlightController<B, R, M> {
    /// Takes ownership of the collaborators and brings the controller up.
    ///
    /// Fails if the board's self-test fails.
    pub fn new(
        mut board: B,
        mut receiver: R,
        mixer: M,
        config: FlightControllerConfig,
    ) -> Result<Self, FlightError> {
        if let Err(error) = board.self_test() {
            log_warn!("Board self-test failed");
            return Err(error.into());
        }

        receiver.begin();

        let state = FlightState {
            armed: config.start_armed,
            ..FlightState::new()
        };

        log_info!("Flight controller initialized");

        Ok(Self {
            board,
            receiver,
            mixer,
            max_arming_angle: deg2rad(config.max_arming_angle_degrees),
            state,
            gyrometer: Gyrometer::new(),
            quaternion: Quaternion::new(),
            stages: Vec::new(),
            sensors: Vec::new(),
            parser: MspParser::new(),
            safe_to_arm: false,
            failsafe: false,
            yaw_reference: 0.0,
        })
    }

    /// Registers a control stage that runs while the aux switch is at
    /// `aux_state` or above. Stages run in registration order.
    pub fn add_control_stage<S: ControlStage + 'static>(&mut self, stage: S, aux_state: u8) {
        self.stages.push(RegisteredStage {
            stage: Box::new(stage),
            aux_state,
        });
    }

    /// Registers an optional sensor, polled after the mandatory ones.
    pub fn add_sensor<S: Sensor + 'static>(&mut self, sensor: S) {
        self.sensors.push(Box::new(sensor));
    }

    /// Runs one update cycle.
    pub fn update(&mut self) {
        if self.check_receiver() {
            return;
        }

        self.check_quaternion();
        self.check_gyrometer();
        self.check_optional_sensors();
    }

    /// Current vehicle state.
    pub fn state(&self) -> &FlightState {
        &self.state
    }

    /// Whether failsafe has been triggered by signal loss.
    pub fn is_failsafe(&self) -> bool {
        self.failsafe
    }

    /// Yaw latched at arming, used for headless demands.
    pub fn yaw_reference(&self) -> f32 {
        self.yaw_reference
    }

    /// MSP link statistics.
    pub fn msp_stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// The board.
    pub fn board(&self) -> &B {
        &self.board
    }

    /// The board, mutably.
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// The receiver.
    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    /// The receiver, mutably.
    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    /// The mixer.
    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    /// The mixer, mutably.
    pub fn mixer_mut(&mut self) -> &mut M {
        &mut self.mixer
    }

    fn safe_angle(&self, axis: usize) -> bool {
        Float::abs(self.state.rotation[axis]) < self.max_arming_angle
    }

    /// Returns `true` when failsafe was entered and the cycle must stop.
    fn check_receiver(&mut self) -> bool {
        if self.receiver.lost_signal() && self.state.armed {
            self.mixer.cut_motors();
            self.state.armed = false;
            self.failsafe = true;
            self.board.show_armed_status(false);
            log_warn!("Receiver signal lost, failsafe engaged");
            return true;
        }

        let yaw_angle_delta = self.state.rotation[AXIS_YAW] - self.yaw_reference;
        if !self.receiver.get_demands(yaw_angle_delta) {
            return false;
        }

        let demands = self.receiver.demands();
        let throttle_is_down = self.receiver.throttle_is_down();
        for registered in self.stages.iter_mut() {
            registered.stage.update_receiver(&demands, throttle_is_down);
        }

        let arm_switch = self.receiver.arm_switch();

        if self.state.armed && !arm_switch {
            self.state.armed = false;
            log_info!("Disarmed by switch");
        }

        // Refuse to arm until the switch has been seen off since power-up.
        if !self.safe_to_arm {
            self.safe_to_arm = !arm_switch;
        }

        if self.safe_to_arm
            && !self.state.armed
            && throttle_is_down
            && arm_switch
            && !self.failsafe
            && self.safe_angle(AXIS_ROLL)
            && self.safe_angle(AXIS_PITCH)
        {
            self.state.armed = true;
            self.yaw_reference = self.state.rotation[AXIS_YAW];
            log_info!("Armed, yaw reference {}", self.yaw_reference);
        }

        if self.state.armed && throttle_is_down {
            self.mixer.cut_motors();
        }

        self.board.show_armed_status(self.state.armed);

        false
    }

    fn check_quaternion(&mut self) {
        let time_us = self.board.micros();

        if self.quaternion.ready(&mut self.board, time_us) {
            self.board.adjust_quaternion(self.quaternion.quaternion_mut());
            self.quaternion.modify_state(&mut self.state);

            let [roll, pitch, _] = &mut self.state.rotation;
            self.board.adjust_roll_and_pitch(roll, pitch);

            // Serial traffic is paced by attitude updates, not the main loop.
            self.do_serial_comms();
        }
    }

    fn check_gyrometer(&mut self) {
        let time_us = self.board.micros();

        if self.gyrometer.ready(&mut self.board, time_us) {
            self.board.adjust_gyrometer(self.gyrometer.rates_mut());
            self.gyrometer.modify_state(&mut self.state);

            let raw = self.receiver.demands();
            let scale = self.receiver.demand_scale();
            let mut demands = Demands {
                throttle: raw.throttle,
                roll: raw.roll * scale,
                pitch: raw.pitch * scale,
                yaw: raw.yaw * scale,
            };

            let should_flash = run_stages(
                &mut self.stages,
                self.receiver.aux_state(),
                &self.state,
                &mut demands,
            );
            self.board.flash_led(should_flash);

            if self.state.armed && !self.failsafe && !self.receiver.throttle_is_down() {
                self.mixer.run_armed(&demands);
            }
        }
    }

    fn check_optional_sensors(&mut self) {
        for sensor in self.sensors.iter_mut() {
            let time_us = self.board.micros();
            if sensor.ready(time_us) {
                sensor.modify_state(&mut self.state, time_us);
            }
        }
    }

    fn do_serial_comms(&mut self) {
        while self.board.serial_available_bytes() > 0 {
            let byte = self.board.serial_read_byte();
            let mut context = CommandContext {
                state: &mut self.state,
                failsafe: &mut self.failsafe,
                yaw_reference: &mut self.yaw_reference,
                receiver: &self.receiver,
                mixer: &mut self.mixer,
            };

            if self.parser.parse(byte, &mut context) {
                log_info!("Reboot requested over MSP");
                self.board.reboot();
            }
        }

        while let Some(byte) = self.parser.read_byte() {
            self.board.serial_write_byte(byte);
        }

        // Ground-station motor testing.
        if !self.state.armed {
            self.mixer.run_disarmed();
        }
    }
}

/// The parts of the controller an MSP request may read or change.
struct CommandContext<'a, R: Receiver, M: Mixer> {
    state: &'a mut FlightState,
    failsafe: &'a mut bool,
    yaw_reference: &'a mut f32,
    receiver: &'a R,
    mixer: &'a mut M,
}

impl<R: Receiver, M: Mixer> MspHandler for CommandContext<'_, R, M> {
    fn handle_state_request(&mut self) -> StateReport {
        // Only heading is estimated on board; negated for display.
        StateReport {
            heading: -self.state.rotation[AXIS_YAW],
            ..StateReport::default()
        }
    }

    fn handle_set_armed(&mut self, armed: bool) {
        if !armed {
            self.state.armed = false;
            log_info!("Disarmed over MSP");
            return;
        }

        if !self.receiver.throttle_is_down() {
            log_warn!("MSP arm refused, throttle not down");
            return;
        }

        if !self.state.armed {
            *self.yaw_reference = self.state.rotation[AXIS_YAW];
        }
        self.state.armed = true;
        if !self.receiver.lost_signal() {
            *self.failsafe = false;
        }
        log_info!("Armed over MSP");
    }

    fn handle_rc_normal_request(&mut self) -> [f32; RAW_CHANNEL_COUNT] {
        let mut channels = [0.0; RAW_CHANNEL_COUNT];
        for (index, channel) in channels.iter_mut().enumerate() {
            *channel = self.receiver.raw_channel(index);
        }
        channels
    }

    fn handle_attitude_radians_request(&mut self) -> [f32; 3] {
        self.state.rotation
    }

    fn handle_set_motor_normal(&mut self, motors: [f32; 4]) {
        *self.mixer.motors_disarmed_mut() = motors;
    }
}
