//! Sound cue selection

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use telemetry::messages::{AlertSize, AudibleAlert, ControlsState};
use telemetry::SubMaster;
use tracing::{debug, info, warn};

use crate::sink::AudioSink;

/// Sound configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Volume at standstill (0..=1)
    pub min_volume: f32,
    /// Volume at and above `full_volume_speed` (0..=1)
    pub max_volume: f32,
    /// Speed reaching max volume (m/s)
    pub full_volume_speed: f32,
    /// Silence from an engaged controls stream before it is reported unresponsive (seconds)
    pub controls_timeout_secs: f64,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            min_volume: 0.2,
            max_volume: 0.5,
            full_volume_speed: 20.0,
            controls_timeout_secs: 5.0,
        }
    }
}

/// Alert as far as sound selection cares
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alert {
    pub text1: String,
    pub text2: String,
    pub alert_type: String,
    pub size: AlertSize,
    pub sound: AudibleAlert,
}

impl Alert {
    pub fn from_controls(cs: &ControlsState) -> Self {
        Self {
            text1: cs.alert_text1.clone(),
            text2: cs.alert_text2.clone(),
            alert_type: cs.alert_type.clone(),
            size: cs.alert_size,
            sound: cs.alert_sound,
        }
    }

    /// Raised locally when an engaged controls stream goes silent
    pub fn controls_unresponsive() -> Self {
        Self {
            text1: "TAKE CONTROL IMMEDIATELY".to_string(),
            text2: "Controls Unresponsive".to_string(),
            alert_type: "controlsUnresponsive".to_string(),
            size: AlertSize::Full,
            sound: AudibleAlert::ChimeWarningRepeat,
        }
    }
}

/// Linear map of `x` from [in_lo, in_hi] onto [out_lo, out_hi], clamped
fn map_val(x: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let t = ((x - in_lo) / (in_hi - in_lo)).clamp(0.0, 1.0);
    out_lo + t * (out_hi - out_lo)
}

/// Chooses which sound to play for the current alert
pub struct SoundSelector<S: AudioSink> {
    config: SoundConfig,
    sink: S,
    alert: Alert,
    volume: f32,
    /// Volume override in percent; within +/-3 the speed-scaled volume is used
    volume_boost: i32,
    looping: HashSet<AudibleAlert>,
    controls_timeout: Duration,
}

impl<S: AudioSink> SoundSelector<S> {
    pub fn new(config: SoundConfig, sink: S) -> Self {
        info!("Creating sound selector with config: {:?}", config);
        let controls_timeout = Duration::try_from_secs_f64(config.controls_timeout_secs)
            .unwrap_or_else(|e| {
                let fallback = SoundConfig::default().controls_timeout_secs;
                warn!(
                    "Invalid controls timeout {}: {}; using {}s",
                    config.controls_timeout_secs, e, fallback
                );
                Duration::from_secs_f64(fallback)
            });
        Self {
            volume: config.min_volume,
            config,
            sink,
            alert: Alert::default(),
            volume_boost: 0,
            looping: HashSet::new(),
            controls_timeout,
        }
    }

    pub fn alert(&self) -> &Alert {
        &self.alert
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn set_volume_boost(&mut self, boost: i32) {
        self.volume_boost = boost;
    }

    /// Volume a new cue is played at
    pub fn playback_volume(&self) -> f32 {
        let boost = self.volume_boost as f32 * 0.01;
        if boost < -0.03 {
            0.0
        } else if boost > 0.03 {
            boost
        } else {
            self.volume
        }
    }

    /// Run once per cycle after the store has been updated
    pub fn update(&mut self, sm: &SubMaster, now: Instant) {
        if let Some(car) = sm.car_state.fresh() {
            self.volume = map_val(
                car.v_ego,
                0.0,
                self.config.full_volume_speed,
                self.config.min_volume,
                self.config.max_volume,
            );
        }

        if let Some(cs) = sm.controls_state.fresh() {
            self.set_alert(Alert::from_controls(cs));
        } else if self.controls_unresponsive(sm, now) {
            self.set_alert(Alert::controls_unresponsive());
        }
    }

    fn controls_unresponsive(&self, sm: &SubMaster, now: Instant) -> bool {
        sm.controls_state.get().enabled
            && sm
                .controls_state
                .age(now)
                .is_some_and(|age| age > self.controls_timeout)
    }

    /// Switch to a new alert: stop looping sounds, then play its cue
    pub fn set_alert(&mut self, alert: Alert) {
        if alert == self.alert {
            return;
        }
        if alert.alert_type == "controlsUnresponsive" {
            warn!("Controls unresponsive");
        }
        debug!("Alert changed: {:?} -> {:?}", self.alert.alert_type, alert.alert_type);

        for sound in self.looping.drain() {
            self.sink.stop(sound);
        }

        if alert.sound != AudibleAlert::None {
            let looping = alert.sound.is_repeating();
            let volume = self.playback_volume();
            self.sink.play(alert.sound, volume, looping);
            if looping {
                self.looping.insert(alert.sound);
            }
            metrics::counter!("cluster_ui_alert_sounds_total").increment(1);
        }

        self.alert = alert;
    }
}
