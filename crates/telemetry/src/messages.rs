//! Telemetry message types
//!
//! Only the fields the cluster UI consumes are modelled. Every struct
//! deserializes with defaults so partial messages are accepted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Controls alert severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertStatus {
    /// No alert, or an informational one
    #[default]
    Normal,
    UserPrompt,
    Critical,
}

/// On-screen size of the current alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertSize {
    #[default]
    None,
    Small,
    Mid,
    Full,
}

/// Sound attached to an alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudibleAlert {
    #[default]
    None,
    ChimeDisengage,
    ChimeEngage,
    ChimeWarning1,
    ChimeWarning2,
    ChimeWarning2Repeat,
    ChimeWarningRepeat,
    ChimeError,
    ChimePrompt,
}

impl AudibleAlert {
    /// Whether the sound loops until the alert changes
    pub fn is_repeating(self) -> bool {
        matches!(
            self,
            AudibleAlert::ChimeWarning2Repeat | AudibleAlert::ChimeWarningRepeat
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidState {
    pub output: f32,
    pub saturated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndiState {
    pub output: f32,
    pub saturated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LqrState {
    pub output: f32,
    pub saturated: bool,
}

/// Lateral controller selection, without its state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LateralControlKind {
    #[default]
    Pid,
    Indi,
    Lqr,
}

impl LateralControlKind {
    /// Label shown next to the steering output
    pub fn name(self) -> &'static str {
        match self {
            LateralControlKind::Pid => "PID",
            LateralControlKind::Indi => "INDI",
            LateralControlKind::Lqr => "LQR",
        }
    }
}

/// State of whichever lateral controller is running
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum LateralControlState {
    Pid(PidState),
    Indi(IndiState),
    Lqr(LqrState),
}

impl Default for LateralControlState {
    fn default() -> Self {
        LateralControlState::Pid(PidState::default())
    }
}

impl LateralControlState {
    pub fn kind(&self) -> LateralControlKind {
        match self {
            LateralControlState::Pid(_) => LateralControlKind::Pid,
            LateralControlState::Indi(_) => LateralControlKind::Indi,
            LateralControlState::Lqr(_) => LateralControlKind::Lqr,
        }
    }

    /// Controller output in [-1, 1], whichever controller is active
    pub fn output(&self) -> f32 {
        match self {
            LateralControlState::Pid(s) => s.output,
            LateralControlState::Indi(s) => s.output,
            LateralControlState::Lqr(s) => s.output,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlsState {
    pub enabled: bool,
    pub engageable: bool,
    pub alert_status: AlertStatus,
    pub alert_size: AlertSize,
    pub alert_text1: String,
    pub alert_text2: String,
    pub alert_type: String,
    pub alert_sound: AudibleAlert,
    pub alert_text_msg1: String,
    pub alert_text_msg2: String,
    pub lateral_control_state: LateralControlState,
    /// Max cruise speed (km/h)
    pub v_cruise: f32,
    pub limit_speed_camera: f32,
    pub limit_speed_camera_dist: f32,
    pub map_sign: i32,
    pub steer_ratio: f32,
    pub dynamic_tr_mode: i32,
    pub dynamic_tr_value: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GearShifter {
    #[default]
    Unknown,
    Park,
    Drive,
    Neutral,
    Reverse,
    Sport,
    Low,
    Brake,
    Eco,
    Manumatic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CruiseState {
    pub enabled: bool,
    pub available: bool,
    pub speed: f32,
    pub cruise_sw_state: bool,
}

/// Tire pressures (psi)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TirePressure {
    pub fl: f32,
    pub fr: f32,
    pub rl: f32,
    pub rr: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarState {
    /// Vehicle speed (m/s)
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
    /// Set speed shown on the dash (km/h)
    pub v_set_dis: f32,
    /// Adaptive cruise actively controlling speed
    pub cruise_acc_status: bool,
    pub steering_angle_deg: f32,
    pub cruise_gap_set: i32,
    pub cruise_state: CruiseState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveParameters {
    pub angle_offset_deg: f32,
    pub angle_offset_average_deg: f32,
    pub stiffness_factor: f32,
    pub steer_ratio: f32,
}

/// One tracked lead vehicle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeadData {
    /// Slot holds a tracked vehicle
    pub status: bool,
    /// Longitudinal distance (m)
    pub d_rel: f32,
    /// Lateral offset, left positive (m)
    pub y_rel: f32,
    /// Relative velocity (m/s)
    pub v_rel: f32,
    pub a_rel: f32,
    /// Detected by radar rather than vision only
    pub radar: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadarState {
    pub lead_one: LeadData,
    pub lead_two: LeadData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveCalibration {
    /// Roll, pitch, yaw (radians)
    pub rpy_calib: [f32; 3],
}

/// Sampled trajectory (x forward, y right, z down, t seconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XyztData {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub t: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelV2 {
    pub frame_id: u32,
    pub position: XyztData,
    pub lane_lines: Vec<XyztData>,
    pub lane_line_probs: Vec<f32>,
    pub road_edges: Vec<XyztData>,
    pub road_edge_stds: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceState {
    pub started: bool,
    pub cpu_usage_percent: Vec<f32>,
    pub cpu_temp_c: Vec<f32>,
    pub battery_temp_c: f32,
    pub ambient_temp_c: f32,
    pub fan_speed_percent_desired: f32,
    pub battery_percent: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PandaType {
    #[default]
    Unknown,
    WhitePanda,
    GreyPanda,
    BlackPanda,
    Pedal,
    Uno,
    Dos,
    RedPanda,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PandaState {
    pub panda_type: PandaType,
    pub ignition_line: bool,
    pub ignition_can: bool,
    pub controls_allowed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeasurementReport {
    pub num_meas: u32,
}

/// Raw GNSS receiver output; only measurement reports are consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UbloxGnss {
    pub measurement_report: Option<MeasurementReport>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GpsLocation {
    /// Horizontal accuracy (m)
    pub accuracy: f32,
    pub altitude: f32,
    pub bearing_deg: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LateralPlan {
    pub lane_width: f32,
    pub d_prob: f32,
    pub l_prob: f32,
    pub r_prob: f32,
    pub steer_rate_cost: f32,
    pub standstill_elapsed_time: f32,
    pub laneless_mode: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveMapData {
    pub speed_limit: f32,
    pub speed_limit_distance: f32,
    pub safety_sign: f32,
    pub road_curvature: f32,
    pub turn_info: i32,
    pub distance_to_turn: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorKind {
    Acceleration,
    GyroUncalibrated,
    Magnetometer,
    Light,
    #[default]
    Other,
}

/// One inertial sensor sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorEvent {
    pub sensor: SensorKind,
    /// Per-axis values; may arrive empty
    pub v: Vec<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoadCameraState {
    pub gain: f32,
    pub integ_lines: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarParams {
    pub openpilot_longitudinal_control: bool,
    pub steer_max_v: Vec<f32>,
    pub steer_actuator_delay: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverMonitoringState {
    pub is_active_mode: bool,
}

/// A decoded message on one topic.
///
/// JSON form: `{"topic": "carState", "data": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "data", rename_all = "camelCase")]
pub enum Message {
    ControlsState(ControlsState),
    CarState(CarState),
    LiveParameters(LiveParameters),
    RadarState(RadarState),
    LiveCalibration(LiveCalibration),
    ModelV2(ModelV2),
    DeviceState(DeviceState),
    PandaState(PandaState),
    UbloxGnss(UbloxGnss),
    GpsLocationExternal(GpsLocation),
    LateralPlan(LateralPlan),
    LiveMapData(LiveMapData),
    SensorEvents(Vec<SensorEvent>),
    RoadCameraState(RoadCameraState),
    CarParams(CarParams),
    DriverMonitoringState(DriverMonitoringState),
}

/// Subscribed topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ControlsState,
    CarState,
    LiveParameters,
    RadarState,
    LiveCalibration,
    ModelV2,
    DeviceState,
    PandaState,
    UbloxGnss,
    GpsLocationExternal,
    LateralPlan,
    LiveMapData,
    SensorEvents,
    RoadCameraState,
    CarParams,
    DriverMonitoringState,
}

impl Topic {
    pub fn name(self) -> &'static str {
        match self {
            Topic::ControlsState => "controlsState",
            Topic::CarState => "carState",
            Topic::LiveParameters => "liveParameters",
            Topic::RadarState => "radarState",
            Topic::LiveCalibration => "liveCalibration",
            Topic::ModelV2 => "modelV2",
            Topic::DeviceState => "deviceState",
            Topic::PandaState => "pandaState",
            Topic::UbloxGnss => "ubloxGnss",
            Topic::GpsLocationExternal => "gpsLocationExternal",
            Topic::LateralPlan => "lateralPlan",
            Topic::LiveMapData => "liveMapData",
            Topic::SensorEvents => "sensorEvents",
            Topic::RoadCameraState => "roadCameraState",
            Topic::CarParams => "carParams",
            Topic::DriverMonitoringState => "driverMonitoringState",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Message {
    pub fn topic(&self) -> Topic {
        match self {
            Message::ControlsState(_) => Topic::ControlsState,
            Message::CarState(_) => Topic::CarState,
            Message::LiveParameters(_) => Topic::LiveParameters,
            Message::RadarState(_) => Topic::RadarState,
            Message::LiveCalibration(_) => Topic::LiveCalibration,
            Message::ModelV2(_) => Topic::ModelV2,
            Message::DeviceState(_) => Topic::DeviceState,
            Message::PandaState(_) => Topic::PandaState,
            Message::UbloxGnss(_) => Topic::UbloxGnss,
            Message::GpsLocationExternal(_) => Topic::GpsLocationExternal,
            Message::LateralPlan(_) => Topic::LateralPlan,
            Message::LiveMapData(_) => Topic::LiveMapData,
            Message::SensorEvents(_) => Topic::SensorEvents,
            Message::RoadCameraState(_) => Topic::RoadCameraState,
            Message::CarParams(_) => Topic::CarParams,
            Message::DriverMonitoringState(_) => Topic::DriverMonitoringState,
        }
    }
}
