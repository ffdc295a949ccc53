//! Road Overlay Projection
//!
//! Maps points from the calibrated car frame into framebuffer pixels:
//! - Calibration rotation from roll/pitch/yaw estimates
//! - Narrow/wide camera intrinsics per hardware profile
//! - Car-space to framebuffer transform with off-screen clipping

pub mod calibration;
pub mod camera;
pub mod projector;

pub use calibration::{view_from_calib, view_from_device, CalibrationState};
pub use camera::{CameraIntrinsics, CameraVariant, HardwareProfile};
pub use projector::{Projector, Vertex, MIN_PROJECTION_DEPTH, PROJECTION_MARGIN};
