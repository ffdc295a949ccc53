//! Alert Sounds
//!
//! Picks the sound cue for the current alert, scales the volume with vehicle
//! speed and raises an alert of its own when controls stop responding.

mod selector;
mod sink;

pub use selector::{Alert, SoundConfig, SoundSelector};
pub use sink::{AudioSink, LoggingSink};
