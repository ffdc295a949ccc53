//! Calibration rotation

use nalgebra::{Matrix3, Rotation3};

/// Axis permutation from the device frame (x forward, y right, z down)
/// to the camera view frame (x right, y down, z forward)
pub fn view_from_device() -> Matrix3<f32> {
    Matrix3::new(
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
        1.0, 0.0, 0.0,
    )
}

/// Rotation from the calibrated car frame into the camera view frame.
///
/// `rpy` is (roll, pitch, yaw) in radians. The device rotation is
/// `Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn view_from_calib(rpy: [f32; 3]) -> Matrix3<f32> {
    let device_from_calib = Rotation3::from_euler_angles(rpy[0], rpy[1], rpy[2]);
    view_from_device() * device_from_calib.into_inner()
}

/// Latest calibration, invalid until the first calibration message
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationState {
    view_from_calib: Option<Matrix3<f32>>,
}

impl CalibrationState {
    /// Replace the rotation from a new roll/pitch/yaw estimate
    pub fn update(&mut self, rpy: [f32; 3]) {
        self.view_from_calib = Some(view_from_calib(rpy));
    }

    /// Whether at least one calibration message has been applied
    pub fn is_valid(&self) -> bool {
        self.view_from_calib.is_some()
    }

    pub fn view_from_calib(&self) -> Option<&Matrix3<f32>> {
        self.view_from_calib.as_ref()
    }
}
