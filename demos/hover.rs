// demos/hover.rs

use free_flight_core::{
    Board, Demands, FlightController, FlightControllerConfig, HoverStage, Motors, QuadXMixer,
    RateStage, RateStageConfig, Receiver,
};

/// Board that reports a level attitude and a slow roll drift.
struct SimBoard {
    time_us: u64,
}

impl Board for SimBoard {
    fn micros(&self) -> u64 {
        self.time_us
    }

    fn get_quaternion(&mut self) -> Option<[f32; 4]> {
        Some([1.0, 0.0, 0.0, 0.0])
    }

    fn get_gyrometer(&mut self) -> Option<[f32; 3]> {
        Some([0.05, 0.0, 0.0])
    }

    fn show_armed_status(&mut self, armed: bool) {
        println!("    armed: {}", armed);
    }

    fn flash_led(&mut self, _on: bool) {}

    fn serial_available_bytes(&mut self) -> usize {
        0
    }

    fn serial_read_byte(&mut self) -> u8 {
        0
    }

    fn serial_write_byte(&mut self, _byte: u8) {}

    fn reboot(&mut self) {}
}

/// Pilot who flips the arming switch, then raises the throttle.
struct ScriptedPilot {
    cycle: u32,
    demands: Demands,
}

impl Receiver for ScriptedPilot {
    fn get_demands(&mut self, _yaw_angle_delta: f32) -> bool {
        self.cycle += 1;
        if self.cycle > 3 {
            self.demands.throttle = 0.3;
        }
        true
    }

    fn demands(&self) -> Demands {
        self.demands
    }

    fn demand_scale(&self) -> f32 {
        1.0
    }

    fn throttle_is_down(&self) -> bool {
        self.demands.throttle < -0.9
    }

    fn lost_signal(&self) -> bool {
        false
    }

    fn aux_state(&self) -> u8 {
        0
    }

    fn arm_switch(&self) -> bool {
        self.cycle >= 2
    }

    fn raw_channel(&self, _index: usize) -> f32 {
        0.0
    }
}

struct PrintMotors;

impl Motors for PrintMotors {
    fn write_motor(&mut self, index: usize, value: f32) {
        println!("    motor {}: {:.3}", index, value);
    }
}

fn main() {
    let board = SimBoard { time_us: 0 };
    let pilot = ScriptedPilot {
        cycle: 0,
        demands: Demands::new(-1.0, 0.0, 0.0, 0.0),
    };
    let mixer = QuadXMixer::new(PrintMotors);

    let mut controller =
        match FlightController::new(board, pilot, mixer, FlightControllerConfig::new()) {
            Ok(controller) => controller,
            Err(error) => {
                println!("startup failed: {}", error);
                return;
            }
        };

    // Set the rate gains. Roll and pitch share them.
    let mut rate = RateStageConfig::new();
    rate.kp_roll = 0.5;
    rate.kp_pitch = 0.5;
    rate.kp_yaw = 0.3;
    controller.add_control_stage(RateStage::with_config(rate), 0);
    controller.add_control_stage(HoverStage::new(1.0), 0);

    for cycle in 0..6 {
        println!("cycle {}", cycle);
        controller.board_mut().time_us += 1_000;
        controller.update();
    }
}
