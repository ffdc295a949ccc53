//! Aggregated scene state

use projection::CalibrationState;
use serde::Serialize;
use telemetry::messages::{
    AlertSize, AlertStatus, AudibleAlert, CarParams, CruiseState, GearShifter, GpsLocation,
    LateralControlKind, LateralPlan, LiveMapData, LiveParameters, PandaType, TirePressure,
};

use crate::lead::LeadMarkers;
use crate::line::LineVertices;

/// Overall driving status shown by the border color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SystemStatus {
    #[default]
    Disengaged,
    Engaged,
    Warning,
    Alert,
    Braking,
    Cruising,
}

/// Fields taken from the controls state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlsView {
    pub enabled: bool,
    pub alert_status: AlertStatus,
    pub alert_size: AlertSize,
    pub alert_text1: String,
    pub alert_text2: String,
    pub alert_type: String,
    pub alert_sound: AudibleAlert,
    pub alert_text_msg1: String,
    pub alert_text_msg2: String,
    /// Lateral controller running
    pub lateral_control: LateralControlKind,
    /// Lateral controller output, whichever controller is active
    pub output_scale: f32,
    /// Max cruise speed (km/h)
    pub v_cruise: f32,
    pub limit_speed_camera: f32,
    pub limit_speed_camera_dist: f32,
    pub map_sign: i32,
    pub steer_ratio: f32,
    pub dynamic_tr_mode: i32,
    pub dynamic_tr_value: f32,
}

/// Fields taken from the car state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CarView {
    pub v_ego: f32,
    pub brake_pressed: bool,
    pub brake_lights: bool,
    pub gear_shifter: GearShifter,
    pub left_blinker: bool,
    pub right_blinker: bool,
    pub left_blindspot: bool,
    pub right_blindspot: bool,
    pub tpms: TirePressure,
    pub radar_distance: f32,
    pub stand_still: bool,
    pub v_set_dis: f32,
    pub cruise_acc_status: bool,
    pub steering_angle_deg: f32,
    pub cruise_gap_set: i32,
    pub cruise_state: CruiseState,
}

/// Averaged device health
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeviceSummary {
    pub cpu_usage_percent: f32,
    pub cpu_temp_c: f32,
    pub battery_temp_c: f32,
    pub ambient_temp_c: f32,
    pub fan_speed_percent: f32,
    pub battery_percent: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PandaSummary {
    pub panda_type: PandaType,
    pub ignition: bool,
    pub controls_allowed: bool,
}

/// Latest inertial samples used for tap-to-wake
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MotionSample {
    pub accel: f32,
    pub gyro: f32,
}

/// Projected model geometry, rebuilt wholesale on every model message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathGeometry {
    pub lane_line_vertices: [LineVertices; 4],
    pub lane_line_probs: [f32; 4],
    pub road_edge_vertices: [LineVertices; 2],
    pub road_edge_stds: [f32; 2],
    pub track_vertices: LineVertices,
    /// Draw distance after clamping to the lead (meters)
    pub max_distance: f32,
}

/// Turn signal arrow animation.
///
/// Restarted on a blinker edge and advanced once per frame while a blinker
/// is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlinkerAnimation {
    rate: i32,
}

impl BlinkerAnimation {
    const START: i32 = 120;
    const WRAP: i32 = 68;
    const STEP: i32 = 5;
    const LIT_FROM: i32 = 30;

    pub fn restart(&mut self) {
        self.rate = Self::START;
    }

    pub fn advance(&mut self) {
        self.rate -= Self::STEP;
        if self.rate < 0 {
            self.rate = Self::WRAP;
        }
    }

    pub fn rate(&self) -> i32 {
        self.rate
    }

    /// Whether the arrow is in its visible phase
    pub fn lit(&self) -> bool {
        (Self::LIT_FROM..=Self::WRAP).contains(&self.rate)
    }
}

impl Default for BlinkerAnimation {
    fn default() -> Self {
        Self { rate: Self::START }
    }
}

/// Everything the renderer needs for one frame.
///
/// Created once with defaults and mutated in place by the aggregator only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub controls: ControlsView,
    pub car: CarView,
    pub live_params: LiveParameters,
    pub device: DeviceSummary,
    pub panda: PandaSummary,
    pub gps: GpsLocation,
    pub satellite_count: u32,
    pub lateral_plan: LateralPlan,
    pub map: LiveMapData,
    pub car_params: CarParams,
    pub motion: MotionSample,
    /// Ambient light estimate in [0, 1]
    pub light_sensor: f32,

    pub calibration: CalibrationState,
    pub world_objects_visible: bool,
    pub geometry: PathGeometry,
    pub leads: LeadMarkers,

    pub started: bool,
    pub engageable: bool,
    pub dm_active: bool,
    pub blinker: BlinkerAnimation,
}
