//! Audio output

use telemetry::messages::AudibleAlert;
use tracing::info;

/// Where selected sound cues are played
pub trait AudioSink {
    /// Start a sound; `looping` sounds repeat until stopped
    fn play(&mut self, sound: AudibleAlert, volume: f32, looping: bool);

    /// Stop a sound if it is playing
    fn stop(&mut self, sound: AudibleAlert);
}

/// Sink that only logs the cues, for builds without audio output
#[derive(Debug, Default)]
pub struct LoggingSink;

impl AudioSink for LoggingSink {
    fn play(&mut self, sound: AudibleAlert, volume: f32, looping: bool) {
        info!("Playing {:?} at volume {:.2} (looping: {})", sound, volume, looping);
    }

    fn stop(&mut self, sound: AudibleAlert) {
        info!("Stopping {:?}", sound);
    }
}

impl<T: AudioSink + ?Sized> AudioSink for Box<T> {
    fn play(&mut self, sound: AudibleAlert, volume: f32, looping: bool) {
        (**self).play(sound, volume, looping);
    }

    fn stop(&mut self, sound: AudibleAlert) {
        (**self).stop(sound);
    }
}
