//! Camera intrinsics and hardware profiles

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Device generation the UI runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareProfile {
    /// Desktop build without camera hardware
    #[default]
    Pc,
    /// Single road camera device
    Eon,
    /// Dual road camera device (narrow + wide)
    Tici,
}

impl HardwareProfile {
    /// Video zoom constant in pixels
    pub fn zoom(self) -> f32 {
        match self {
            HardwareProfile::Tici => 2912.8,
            _ => 2138.5,
        }
    }

    /// Vertical offset of the video centre on the framebuffer
    pub fn y_offset(self) -> f32 {
        match self {
            HardwareProfile::Eon => 0.0,
            _ => 150.0,
        }
    }

    /// Whether a wide road camera stream exists
    pub fn has_wide_camera(self) -> bool {
        matches!(self, HardwareProfile::Tici)
    }

    /// Whether a real camera is attached (video timeouts are expected otherwise)
    pub fn has_camera(self) -> bool {
        !matches!(self, HardwareProfile::Pc)
    }

    /// Sensor-specific divisor applied to the exposure ceiling
    pub fn exposure_divisor(self) -> f32 {
        match self {
            HardwareProfile::Tici => 6.0,
            _ => 1.0,
        }
    }

    /// Exposure value (gain * integration lines) treated as fully dark
    pub fn max_exposure(self) -> f32 {
        let (max_lines, max_gain) = match self {
            HardwareProfile::Eon => (5408.0, 1.0),
            _ => (1904.0, 10.0),
        };
        max_lines * max_gain / self.exposure_divisor()
    }
}

/// Road camera selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraVariant {
    #[default]
    Narrow,
    Wide,
}

/// Pinhole camera intrinsics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in x (pixels)
    pub fx: f32,
    /// Focal length in y (pixels)
    pub fy: f32,
    /// Principal point x (pixels)
    pub cx: f32,
    /// Principal point y (pixels)
    pub cy: f32,
}

impl CameraIntrinsics {
    /// Intrinsics of the given camera on the given hardware.
    ///
    /// Hardware without a wide camera always reports its road camera.
    pub fn for_camera(variant: CameraVariant, hardware: HardwareProfile) -> Self {
        match (hardware, variant) {
            (HardwareProfile::Eon, _) => Self {
                fx: 910.0,
                fy: 910.0,
                cx: 1164.0 / 2.0,
                cy: 874.0 / 2.0,
            },
            (_, CameraVariant::Narrow) => Self {
                fx: 2648.0,
                fy: 2648.0,
                cx: 1928.0 / 2.0,
                cy: 1208.0 / 2.0,
            },
            (_, CameraVariant::Wide) => Self {
                fx: 567.0,
                fy: 567.0,
                cx: 1928.0 / 2.0,
                cy: 1208.0 / 2.0,
            },
        }
    }

    /// 3x3 intrinsic matrix K
    pub fn matrix(&self) -> Matrix3<f32> {
        Matrix3::new(
            self.fx, 0.0, self.cx,
            0.0, self.fy, self.cy,
            0.0, 0.0, 1.0,
        )
    }
}
