//! Backlight brightness

use serde::{Deserialize, Serialize};
use telemetry::UI_FREQ;
use tracing::debug;

use crate::filter::FirstOrderFilter;
use crate::DisplayInputs;

/// Backlight level while offroad (percent)
pub const BACKLIGHT_OFFROAD: f32 = 75.0;

const BACKLIGHT_TS: f32 = 10.0;
const BACKLIGHT_DT: f32 = 0.05;

/// Brightness-related user settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightnessSettings {
    /// Idle screen-off: minutes if > 0, 0 = 30 s, -1 = 15 s, -2 = never
    pub auto_screen_off: i32,
    /// Fixed brightness percentage, 0 = automatic
    pub manual: u8,
    /// Percentage of the automatic level kept once the idle countdown expires
    pub brightness_off: u8,
}

/// Perceived brightness (percent, 10..=100) for a light estimate in [0, 1].
///
/// Uses CIE 1931 lightness so the backlight follows how bright the
/// surroundings look rather than the raw exposure.
pub fn perceived_brightness(light_sensor: f32) -> f32 {
    let l = 100.0 * light_sensor;
    let y = if l <= 8.0 {
        l / 903.3
    } else {
        ((l + 16.0) / 116.0).powi(3)
    };
    (100.0 * y).clamp(10.0, 100.0)
}

/// Idle countdown length in frames, `None` when idle dimming is disabled
pub fn idle_timeout_frames(auto_screen_off: i32) -> Option<u32> {
    let seconds = match auto_screen_off {
        m if m > 0 => m as u64 * 60,
        0 => 30,
        -1 => 15,
        _ => return None,
    };
    Some((seconds * UI_FREQ) as u32)
}

/// Computes the backlight level once per cycle
#[derive(Debug, Clone)]
pub struct BrightnessController {
    filter: FirstOrderFilter,
    /// Frames left before idle dimming, `None` until armed
    idle_countdown: Option<u32>,
    last_level: Option<u8>,
}

impl Default for BrightnessController {
    fn default() -> Self {
        Self::new()
    }
}

impl BrightnessController {
    pub fn new() -> Self {
        Self {
            filter: FirstOrderFilter::new(BACKLIGHT_OFFROAD, BACKLIGHT_TS, BACKLIGHT_DT),
            idle_countdown: None,
            last_level: None,
        }
    }

    pub fn idle_countdown(&self) -> Option<u32> {
        self.idle_countdown
    }

    pub fn last_level(&self) -> Option<u8> {
        self.last_level
    }

    /// Compute this cycle's level. Returns it only when it differs from the
    /// previously returned level.
    pub fn update(
        &mut self,
        inputs: &DisplayInputs,
        awake: bool,
        settings: &BrightnessSettings,
    ) -> Option<u8> {
        let idle_timeout = idle_timeout_frames(settings.auto_screen_off);

        let target = if inputs.started {
            if let Some(timeout) = idle_timeout {
                self.tick_idle(inputs, timeout);
            }
            perceived_brightness(inputs.light_sensor)
        } else {
            BACKLIGHT_OFFROAD
        };

        let filtered = self.filter.update(target);
        let idle_expired = idle_timeout.is_some() && self.idle_countdown == Some(0);

        let level = if !awake {
            0.0
        } else if inputs.started && idle_expired {
            settings.brightness_off as f32 * 0.01 * filtered
        } else if settings.manual != 0 {
            settings.manual as f32 * 0.99
        } else {
            filtered
        };
        let level = level.clamp(0.0, 100.0) as u8;

        if self.last_level == Some(level) {
            return None;
        }
        debug!("Backlight level {} -> {}", self.last_level.unwrap_or(0), level);
        self.last_level = Some(level);
        Some(level)
    }

    fn tick_idle(&mut self, inputs: &DisplayInputs, timeout: u32) {
        self.idle_countdown = if inputs.touched || inputs.alert_visible {
            Some(timeout)
        } else {
            match self.idle_countdown {
                Some(k) if k > 0 => Some(k - 1),
                Some(0) => Some(0),
                _ => Some(timeout),
            }
        };
    }
}
