//! Car space to framebuffer projection

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use crate::camera::{CameraIntrinsics, CameraVariant, HardwareProfile};

/// Points may land this far outside the framebuffer and still be drawn (pixels)
pub const PROJECTION_MARGIN: f32 = 500.0;

/// Smallest camera-frame depth accepted before the perspective divide (meters)
pub const MIN_PROJECTION_DEPTH: f32 = 1e-3;

/// Framebuffer pixel position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
}

/// Projection for one camera variant and framebuffer size.
///
/// Rebuilt only when the camera choice or the framebuffer changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    variant: CameraVariant,
    intrinsics: CameraIntrinsics,
    zoom: f32,
    y_offset: f32,
    width: f32,
    height: f32,
}

impl Projector {
    /// Create a projector for a camera variant and framebuffer size
    pub fn new(variant: CameraVariant, hardware: HardwareProfile, width: u32, height: u32) -> Self {
        let intrinsics = CameraIntrinsics::for_camera(variant, hardware);

        let mut zoom = hardware.zoom() / intrinsics.fx;
        if variant == CameraVariant::Wide {
            zoom *= 0.5;
        }

        Self {
            variant,
            intrinsics,
            zoom,
            y_offset: hardware.y_offset(),
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn variant(&self) -> CameraVariant {
        self.variant
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    /// Scale from camera pixels to framebuffer pixels
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Framebuffer (width, height)
    pub fn framebuffer_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Project a car-frame point (x forward, y right, z down) into the framebuffer.
    ///
    /// Returns `None` when the point is at or behind the camera plane, when the
    /// result is not finite, or when it lands outside the framebuffer expanded
    /// by [`PROJECTION_MARGIN`].
    pub fn project(&self, view_from_calib: &Matrix3<f32>, point: [f32; 3]) -> Option<Vertex> {
        let ep = view_from_calib * Vector3::from(point);
        let kep = self.intrinsics.matrix() * ep;

        // NaN depth falls through to the finiteness check below
        if kep.z < MIN_PROJECTION_DEPTH {
            return None;
        }

        let vertex = self.camera_to_framebuffer(kep.x / kep.z, kep.y / kep.z);
        if !vertex.x.is_finite() || !vertex.y.is_finite() {
            return None;
        }

        self.is_visible(vertex).then_some(vertex)
    }

    /// Whether a vertex lies inside the framebuffer plus margin
    pub fn is_visible(&self, v: Vertex) -> bool {
        v.x >= -PROJECTION_MARGIN
            && v.x <= self.width + PROJECTION_MARGIN
            && v.y >= -PROJECTION_MARGIN
            && v.y <= self.height + PROJECTION_MARGIN
    }

    /// Map camera pixel coordinates onto the framebuffer: principal point to
    /// the framebuffer centre (shifted by the hardware y offset), scaled by zoom.
    fn camera_to_framebuffer(&self, x: f32, y: f32) -> Vertex {
        Vertex {
            x: (x - self.intrinsics.cx) * self.zoom + self.width / 2.0,
            y: (y - self.intrinsics.cy) * self.zoom + self.height / 2.0 + self.y_offset,
        }
    }

    /// Clip-space transform for the video texture quad, matching the overlay scale
    pub fn frame_transform(&self) -> Matrix4<f32> {
        let zx = self.zoom * 2.0 * self.intrinsics.cx / self.width;
        let zy = self.zoom * 2.0 * self.intrinsics.cy / self.height;

        Matrix4::new(
            zx, 0.0, 0.0, 0.0,
            0.0, zy, 0.0, -self.y_offset / self.height * 2.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}
