//! Backlight and display power

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// `bl_power` value for a powered panel
const FB_BLANK_UNBLANK: u8 = 0;
/// `bl_power` value for a powered-down panel
const FB_BLANK_POWERDOWN: u8 = 4;

/// Backlight error types
#[derive(Error, Debug)]
pub enum BacklightError {
    #[error("Backlight I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid max_brightness in {0}")]
    InvalidMax(PathBuf),
}

/// Hardware side of the display controllers. Calls may block, so the UI
/// loop dispatches them off its own task.
pub trait BacklightActuator: Send + Sync + 'static {
    /// Set the backlight to a percentage (0..=100)
    fn set_brightness(&self, percent: u8) -> Result<(), BacklightError>;

    /// Power the panel on or off
    fn set_display_power(&self, on: bool) -> Result<(), BacklightError>;
}

/// Linux sysfs backlight class device, e.g. `/sys/class/backlight/panel0-backlight`
#[derive(Debug, Clone)]
pub struct SysfsBacklight {
    dir: PathBuf,
    max_brightness: u32,
}

impl SysfsBacklight {
    /// Open a backlight directory, reading its `max_brightness`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BacklightError> {
        let dir = dir.into();
        let max_path = dir.join("max_brightness");
        let raw = read_attr(&max_path)?;
        let max_brightness = raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|max| *max > 0)
            .ok_or_else(|| BacklightError::InvalidMax(max_path.clone()))?;

        info!("Opened backlight {:?} (max {})", dir, max_brightness);
        Ok(Self {
            dir,
            max_brightness,
        })
    }

    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    /// Raw sysfs value for a percentage
    pub fn raw_level(&self, percent: u8) -> u32 {
        let percent = u32::from(percent.min(100));
        (percent * self.max_brightness + 50) / 100
    }
}

impl BacklightActuator for SysfsBacklight {
    fn set_brightness(&self, percent: u8) -> Result<(), BacklightError> {
        let raw = self.raw_level(percent);
        debug!("Backlight {}% -> {}", percent, raw);
        write_attr(&self.dir.join("brightness"), raw)
    }

    fn set_display_power(&self, on: bool) -> Result<(), BacklightError> {
        let value = if on {
            FB_BLANK_UNBLANK
        } else {
            FB_BLANK_POWERDOWN
        };
        debug!("Display power {}", if on { "on" } else { "off" });
        write_attr(&self.dir.join("bl_power"), value)
    }
}

fn read_attr(path: &Path) -> Result<String, BacklightError> {
    fs::read_to_string(path).map_err(|source| BacklightError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_attr(path: &Path, value: impl ToString) -> Result<(), BacklightError> {
    fs::write(path, value.to_string()).map_err(|source| BacklightError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Actuator for devices without a controllable backlight
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBacklight;

impl BacklightActuator for NoopBacklight {
    fn set_brightness(&self, percent: u8) -> Result<(), BacklightError> {
        debug!("Backlight {}% (no backlight device)", percent);
        Ok(())
    }

    fn set_display_power(&self, on: bool) -> Result<(), BacklightError> {
        debug!("Display power {} (no backlight device)", on);
        Ok(())
    }
}
