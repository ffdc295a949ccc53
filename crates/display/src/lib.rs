//! Display Management
//!
//! Decides the backlight level and whether the display should be powered:
//! - Ambient light to perceived brightness with first-order smoothing
//! - Idle dimming countdown
//! - Tap-to-wake from inertial sensors while parked

mod brightness;
mod filter;
mod wake;

pub use brightness::{
    idle_timeout_frames, perceived_brightness, BrightnessController, BrightnessSettings,
    BACKLIGHT_OFFROAD,
};
pub use filter::FirstOrderFilter;
pub use wake::{WakefulnessController, AWAKE_TIMEOUT_FRAMES};

/// Per-cycle inputs shared by the brightness and wake controllers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayInputs {
    pub started: bool,
    pub ignition: bool,
    /// Ambient light estimate in [0, 1]
    pub light_sensor: f32,
    /// Screen was touched since the last cycle
    pub touched: bool,
    /// An alert is currently shown on screen
    pub alert_visible: bool,
    pub accel: f32,
    pub gyro: f32,
}
