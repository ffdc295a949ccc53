//! Instrument Cluster UI
//!
//! Wires the pipeline crates into one loop:
//! - Telemetry subscription and scene aggregation
//! - Status derivation and camera selection
//! - Backlight, wakefulness and sound cues
//! - A render driver seam for whatever draws the frame

pub mod backlight;
pub mod driver;
pub mod render;
pub mod settings;

pub use backlight::{BacklightActuator, BacklightError, NoopBacklight, SysfsBacklight};
pub use driver::{UiDriver, OFFROAD_CYCLE, SETTINGS_RELOAD_FRAMES, TELEMETRY_QUEUE};
pub use render::{RenderDriver, TraceRenderer};
pub use settings::{AppConfig, ConfigFileStore, SettingsError, SettingsStore};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging at `level`, falling back to INFO for unknown names
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
