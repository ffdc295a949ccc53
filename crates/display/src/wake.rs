//! Display wakefulness

use telemetry::UI_FREQ;
use tracing::debug;

use crate::DisplayInputs;

/// Frames the display stays on after the last wake reason
pub const AWAKE_TIMEOUT_FRAMES: u32 = 30 * UI_FREQ as u32;

/// Samples in the smoothed acceleration baseline
const ACCEL_SAMPLES: f32 = (5 * UI_FREQ) as f32;

const ACCEL_TAP_THRESHOLD: f32 = 0.2;
const GYRO_TAP_THRESHOLD: f32 = 0.15;

/// Keeps the display on while driving and wakes it on a tap while parked
#[derive(Debug, Clone)]
pub struct WakefulnessController {
    awake: bool,
    awake_timeout: u32,
    accel_prev: f32,
    gyro_prev: f32,
}

impl Default for WakefulnessController {
    fn default() -> Self {
        Self::new()
    }
}

impl WakefulnessController {
    /// Starts awake with a full timeout
    pub fn new() -> Self {
        Self {
            awake: true,
            awake_timeout: AWAKE_TIMEOUT_FRAMES,
            accel_prev: 0.0,
            gyro_prev: 0.0,
        }
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    pub fn awake_timeout(&self) -> u32 {
        self.awake_timeout
    }

    /// Run once per cycle. Returns the new display power state when it flips.
    pub fn update(&mut self, inputs: &DisplayInputs) -> Option<bool> {
        self.awake_timeout = self.awake_timeout.saturating_sub(1);

        let mut should_wake = inputs.started || inputs.ignition || inputs.touched;
        if !should_wake {
            should_wake = self.detect_tap(inputs.accel, inputs.gyro);
        }
        if should_wake {
            self.awake_timeout = AWAKE_TIMEOUT_FRAMES;
        }

        let awake = self.awake_timeout > 0;
        if awake == self.awake {
            return None;
        }
        debug!("Display power {}", if awake { "on" } else { "off" });
        self.awake = awake;
        Some(awake)
    }

    /// Tap heuristic: a jolt against the smoothed acceleration baseline
    /// together with a rotation kick
    fn detect_tap(&mut self, accel: f32, gyro: f32) -> bool {
        let accel_trigger = (accel - self.accel_prev).abs() > ACCEL_TAP_THRESHOLD;
        let gyro_trigger = (gyro - self.gyro_prev).abs() > GYRO_TAP_THRESHOLD;

        self.gyro_prev = gyro;
        self.accel_prev = (self.accel_prev * (ACCEL_SAMPLES - 1.0) + accel) / ACCEL_SAMPLES;

        accel_trigger && gyro_trigger
    }
}
