// src/datatypes.rs

//! Vehicle state and demand types shared by the controller, the control
//! stages and the collaborator traits.

/// Index of the roll axis in rotation and angular-velocity arrays.
pub const AXIS_ROLL: usize = 0;
/// Index of the pitch axis in rotation and angular-velocity arrays.
pub const AXIS_PITCH: usize = 1;
/// Index of the yaw axis in rotation and angular-velocity arrays.
pub const AXIS_YAW: usize = 2;

/// Estimated state of the vehicle.
///
/// Owned by the [`FlightController`](crate::FlightController). Sensors fold
/// their estimates into it and the arming state machine toggles `armed`;
/// control stages only ever see it by shared reference.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightState {
    /// Euler angles (roll, pitch, yaw) in radians.
    pub rotation: [f32; 3],
    /// Body angular rates (roll, pitch, yaw) in radians per second.
    pub angular_velocities: [f32; 3],
    /// Altitude above the arming point in meters.
    pub altitude: f32,
    /// Vertical rate in meters per second, positive up.
    pub variometer: f32,
    /// Position along the forward axis in meters.
    pub position_x: f32,
    /// Position along the rightward axis in meters.
    pub position_y: f32,
    /// Forward velocity in meters per second.
    pub velocity_forward: f32,
    /// Rightward velocity in meters per second.
    pub velocity_rightward: f32,
    /// Whether the motors may be driven by the control pipeline.
    pub armed: bool,
}

impl FlightState {
    /// Creates a zeroed, disarmed state.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Normalized demands for each control axis.
///
/// Throttle nominally spans `[-1, 1]` as delivered by the receiver; roll,
/// pitch and yaw are signed and centered on zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Demands {
    /// Collective thrust demand.
    pub throttle: f32,
    /// Roll demand.
    pub roll: f32,
    /// Pitch demand.
    pub pitch: f32,
    /// Yaw demand.
    pub yaw: f32,
}

impl Demands {
    /// Creates a demand vector from its four components.
    pub fn new(throttle: f32, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }
}

/// Converts degrees to radians.
pub fn deg2rad(degrees: f32) -> f32 {
    degrees * core::f32::consts::PI / 180.0
}
