//! Scene tuning and user settings

use serde::{Deserialize, Serialize};
use telemetry::UI_FREQ;

/// Scene tuning constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Lead two is hidden unless it is further than this from lead one (meters)
    pub lead_separation_m: f32,
    /// Frames without a panda state before the hardware type reads as unknown
    pub panda_timeout_frames: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            lead_separation_m: 3.0,
            panda_timeout_frames: 5 * UI_FREQ,
        }
    }
}

/// User toggles read from the settings store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Show km/h instead of mph
    pub is_metric: bool,
    /// Diagnostic view: go onroad without ignition
    pub openpilot_view_enabled: bool,
    /// Prefer the wide road camera where available
    pub enable_wide_camera: bool,
    /// Idle screen-off: minutes if > 0, 0 = 30 s, -1 = 15 s, -2 = never
    pub auto_screen_off: i32,
    /// Fixed brightness percentage, 0 = follow the light sensor
    pub brightness: u8,
    /// Brightness percentage kept once the idle timer expires
    pub brightness_off: u8,
    /// Highlight blind-spot warnings
    pub blind_spot_detect: bool,
    /// Tolerance added to camera speed limits (percent)
    pub speed_limit_offset: i32,
    /// Alert volume override in percent; within +/-3 follows vehicle speed
    pub volume_boost: i32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            is_metric: true,
            openpilot_view_enabled: false,
            enable_wide_camera: false,
            auto_screen_off: 0,
            brightness: 0,
            brightness_off: 0,
            blind_spot_detect: true,
            speed_limit_offset: 0,
            volume_boost: 0,
        }
    }
}
