//! Application configuration and user settings

use std::path::PathBuf;

use alerting::SoundConfig;
use projection::HardwareProfile;
use scene::{SceneConfig, UiSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix for overrides, e.g. `CLUSTER_UI__SETTINGS__IS_METRIC=false`
pub const ENV_PREFIX: &str = "CLUSTER_UI";

/// Settings error types
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Device generation
    pub hardware: HardwareProfile,
    /// Framebuffer width (pixels)
    pub framebuffer_width: u32,
    /// Framebuffer height (pixels)
    pub framebuffer_height: u32,
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Sysfs backlight directory; no backlight control when unset
    pub backlight_dir: Option<PathBuf>,
    /// How long one video receive waits for a frame (milliseconds)
    pub video_timeout_ms: u64,
    pub scene: SceneConfig,
    pub sound: SoundConfig,
    /// User toggles, re-read while running
    pub settings: UiSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hardware: HardwareProfile::Pc,
            framebuffer_width: 1920,
            framebuffer_height: 1080,
            log_level: "info".to_string(),
            log_json: false,
            backlight_dir: None,
            video_timeout_ms: 100,
            scene: SceneConfig::default(),
            sound: SoundConfig::default(),
            settings: UiSettings::default(),
        }
    }
}

/// Source of user settings, polled while running
pub trait SettingsStore {
    fn load(&self) -> Result<UiSettings, SettingsError>;
}

/// Settings from an optional TOML/JSON/YAML file plus `CLUSTER_UI__*` environment overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigFileStore {
    path: Option<PathBuf>,
}

impl ConfigFileStore {
    /// A missing file is not an error; defaults and environment apply
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Read the full application configuration
    pub fn load_app_config(&self) -> Result<AppConfig, SettingsError> {
        let mut builder = config::Config::builder();
        if let Some(path) = &self.path {
            builder = builder.add_source(config::File::from(path.as_path()).required(false));
        }
        let cfg = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}

impl SettingsStore for ConfigFileStore {
    fn load(&self) -> Result<UiSettings, SettingsError> {
        Ok(self.load_app_config()?.settings)
    }
}
