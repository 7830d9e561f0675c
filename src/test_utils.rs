// src/test_utils.rs

//! This module contains utilities for testing: float comparisons and mock
//! collaborators that record what the flight controller asked of them.

use crate::mixer::QUAD_MOTOR_COUNT;
use crate::receiver::RAW_CHANNEL_COUNT;
use crate::{Board, BoardError, ControlStage, Demands, FlightState, Mixer, Receiver, Sensor};
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

/// A constant defining the tolerance within which floating-point values
/// are considered close enough to be equal.
pub const TEST_TOLERANCE: f32 = 1e-5;

/// Checks if two floating point numbers are close enough to be considered
/// equal.
pub fn value_close(target: f32, value: f32) -> bool {
    let difference = target - value;
    -TEST_TOLERANCE < difference && difference < TEST_TOLERANCE
}

/// Checks if each of the components in a vector is close enough to
/// be considered equal.
pub fn vector_close(target: (f32, f32, f32), value: (f32, f32, f32)) -> bool {
    value_close(target.0, value.0)
        && value_close(target.1, value.1)
        && value_close(target.2, value.2)
}

/// Board with scripted sensor readings and an in-memory serial port.
pub struct MockBoard {
    pub time_us: u64,
    pub quaternion: Option<[f32; 4]>,
    pub gyrometer: Option<[f32; 3]>,
    pub self_test_result: Result<(), BoardError>,
    pub roll_trim: f32,
    pub pitch_trim: f32,
    pub armed_status: Option<bool>,
    pub led_flashes: Vec<bool>,
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub reboots: usize,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            time_us: 0,
            quaternion: None,
            gyrometer: None,
            self_test_result: Ok(()),
            roll_trim: 0.0,
            pitch_trim: 0.0,
            armed_status: None,
            led_flashes: Vec::new(),
            rx: VecDeque::new(),
            tx: Vec::new(),
            reboots: 0,
        }
    }

    /// Queues bytes as if received from a ground station.
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx.extend(data.iter().copied());
    }

    /// Takes everything written to the serial port so far.
    pub fn take_tx(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }
}

impl Board for MockBoard {
    fn micros(&self) -> u64 {
        self.time_us
    }

    fn self_test(&mut self) -> Result<(), BoardError> {
        self.self_test_result
    }

    fn get_quaternion(&mut self) -> Option<[f32; 4]> {
        self.quaternion.take()
    }

    fn get_gyrometer(&mut self) -> Option<[f32; 3]> {
        self.gyrometer.take()
    }

    fn adjust_roll_and_pitch(&mut self, roll: &mut f32, pitch: &mut f32) {
        *roll += self.roll_trim;
        *pitch += self.pitch_trim;
    }

    fn show_armed_status(&mut self, armed: bool) {
        self.armed_status = Some(armed);
    }

    fn flash_led(&mut self, on: bool) {
        self.led_flashes.push(on);
    }

    fn serial_available_bytes(&mut self) -> usize {
        self.rx.len()
    }

    fn serial_read_byte(&mut self) -> u8 {
        self.rx.pop_front().unwrap_or(0)
    }

    fn serial_write_byte(&mut self, byte: u8) {
        self.tx.push(byte);
    }

    fn reboot(&mut self) {
        self.reboots += 1;
    }
}

/// Receiver whose sticks and switches are set directly by the test.
pub struct MockReceiver {
    pub demands: Demands,
    pub demand_scale: f32,
    pub new_frame: bool,
    pub throttle_down: bool,
    pub lost: bool,
    pub aux: u8,
    pub arm: bool,
    pub channels: [f32; RAW_CHANNEL_COUNT],
    pub begun: bool,
    pub last_yaw_delta: Option<f32>,
}

impl MockReceiver {
    /// Sticks centered, throttle down, switches off, link up.
    pub fn new() -> Self {
        Self {
            demands: Demands::new(-1.0, 0.0, 0.0, 0.0),
            demand_scale: 1.0,
            new_frame: true,
            throttle_down: true,
            lost: false,
            aux: 0,
            arm: false,
            channels: [0.0; RAW_CHANNEL_COUNT],
            begun: false,
            last_yaw_delta: None,
        }
    }
}

impl Receiver for MockReceiver {
    fn begin(&mut self) {
        self.begun = true;
    }

    fn get_demands(&mut self, yaw_angle_delta: f32) -> bool {
        self.last_yaw_delta = Some(yaw_angle_delta);
        self.new_frame
    }

    fn demands(&self) -> Demands {
        self.demands
    }

    fn demand_scale(&self) -> f32 {
        self.demand_scale
    }

    fn throttle_is_down(&self) -> bool {
        self.throttle_down
    }

    fn lost_signal(&self) -> bool {
        self.lost
    }

    fn aux_state(&self) -> u8 {
        self.aux
    }

    fn arm_switch(&self) -> bool {
        self.arm
    }

    fn raw_channel(&self, index: usize) -> f32 {
        self.channels[index]
    }
}

/// One call made to a [`MockMixer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixerEvent {
    Armed(Demands),
    Disarmed,
    Cut,
}

/// Mixer that records calls in order.
pub struct MockMixer {
    pub events: Vec<MixerEvent>,
    pub motors_disarmed: [f32; QUAD_MOTOR_COUNT],
}

impl MockMixer {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            motors_disarmed: [0.0; QUAD_MOTOR_COUNT],
        }
    }

    pub fn cuts(&self) -> usize {
        self.count(|event| *event == MixerEvent::Cut)
    }

    pub fn disarmed_runs(&self) -> usize {
        self.count(|event| *event == MixerEvent::Disarmed)
    }

    pub fn armed_runs(&self) -> Vec<Demands> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MixerEvent::Armed(demands) => Some(*demands),
                _ => None,
            })
            .collect()
    }

    fn count(&self, predicate: impl Fn(&MixerEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }
}

impl Mixer for MockMixer {
    fn run_armed(&mut self, demands: &Demands) {
        self.events.push(MixerEvent::Armed(*demands));
    }

    fn run_disarmed(&mut self) {
        self.events.push(MixerEvent::Disarmed);
    }

    fn cut_motors(&mut self) {
        self.events.push(MixerEvent::Cut);
    }

    fn motors_disarmed_mut(&mut self) -> &mut [f32; QUAD_MOTOR_COUNT] {
        &mut self.motors_disarmed
    }
}

/// Optional sensor reporting a fixed altitude and climb rate when ready.
pub struct MockSensor {
    pub ready: bool,
    pub altitude: f32,
    pub variometer: f32,
}

impl Sensor for MockSensor {
    fn ready(&mut self, _time_us: u64) -> bool {
        self.ready
    }

    fn modify_state(&mut self, state: &mut FlightState, _time_us: u64) {
        state.altitude = self.altitude;
        state.variometer = self.variometer;
    }
}

/// Stage computing `pitch = pitch * scale + offset`.
pub struct AffinePitchStage {
    scale: f32,
    offset: f32,
    flash: bool,
}

impl AffinePitchStage {
    pub fn new(scale: f32, offset: f32) -> Self {
        Self {
            scale,
            offset,
            flash: false,
        }
    }

    /// Makes the stage request the LED whenever it runs.
    pub fn flashing(mut self) -> Self {
        self.flash = true;
        self
    }
}

impl ControlStage for AffinePitchStage {
    fn modify_demands(&mut self, _state: &FlightState, demands: &mut Demands) -> bool {
        demands.pitch = demands.pitch * self.scale + self.offset;
        self.flash
    }
}

/// Shared log of what a [`RecordingStage`] saw.
#[derive(Default)]
pub struct StageLog {
    pub receiver_updates: Vec<(Demands, bool)>,
    pub runs: usize,
}

/// Stage that overwrites the demands and records its calls.
pub struct RecordingStage {
    pub output: Demands,
    pub log: Rc<RefCell<StageLog>>,
}

impl RecordingStage {
    pub fn new(output: Demands) -> (Self, Rc<RefCell<StageLog>>) {
        let log = Rc::new(RefCell::new(StageLog::default()));
        (
            Self {
                output,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl ControlStage for RecordingStage {
    fn modify_demands(&mut self, _state: &FlightState, demands: &mut Demands) -> bool {
        self.log.borrow_mut().runs += 1;
        *demands = self.output;
        false
    }

    fn update_receiver(&mut self, demands: &Demands, throttle_is_down: bool) {
        self.log
            .borrow_mut()
            .receiver_updates
            .push((*demands, throttle_is_down));
    }
}
