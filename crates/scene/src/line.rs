//! Ribbon polygons for lane lines, road edges and the driving path

use nalgebra::Matrix3;
use projection::{Projector, Vertex};
use telemetry::messages::XyztData;

/// Samples per model trajectory
pub const TRAJECTORY_SIZE: usize = 33;

/// Vertex capacity of one ribbon: a forward and a backward pass
pub const MAX_LINE_VERTICES: usize = 2 * TRAJECTORY_SIZE;

/// Fixed-capacity vertex buffer for one ribbon.
///
/// Pushing past [`MAX_LINE_VERTICES`] is a programming error and panics.
#[derive(Debug, Clone, PartialEq)]
pub struct LineVertices {
    vertices: Vec<Vertex>,
}

impl Default for LineVertices {
    fn default() -> Self {
        Self {
            vertices: Vec::with_capacity(MAX_LINE_VERTICES),
        }
    }
}

impl LineVertices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, vertex: Vertex) {
        assert!(
            self.vertices.len() < MAX_LINE_VERTICES,
            "line vertex buffer overflow ({} vertices)",
            MAX_LINE_VERTICES
        );
        self.vertices.push(vertex);
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }
}

/// Index of the last sample closer than `max` along x.
///
/// Scans at most [`TRAJECTORY_SIZE`] samples and stops at the first one at or
/// beyond `max`. Returns 0 when the first sample is already too far.
pub fn get_path_length_idx(xs: &[f32], max: f32) -> usize {
    xs.iter()
        .take(TRAJECTORY_SIZE)
        .take_while(|&&x| x < max)
        .count()
        .saturating_sub(1)
}

/// Build a closed ribbon around `line` into `out`.
///
/// Samples `0..=max_idx` are projected with `y - y_off` going forward, then
/// with `y + y_off` coming back. Samples that fail to project, or that are
/// missing from a short trajectory, are skipped.
pub fn build_ribbon(
    projector: &Projector,
    view_from_calib: &Matrix3<f32>,
    line: &XyztData,
    y_off: f32,
    z_off: f32,
    max_idx: usize,
    out: &mut LineVertices,
) {
    out.clear();

    let sample = |i: usize| -> Option<(f32, f32, f32)> {
        Some((*line.x.get(i)?, *line.y.get(i)?, *line.z.get(i)?))
    };

    for i in 0..=max_idx {
        if let Some((x, y, z)) = sample(i) {
            if let Some(v) = projector.project(view_from_calib, [x, y - y_off, z + z_off]) {
                out.push(v);
            }
        }
    }

    for i in (0..=max_idx).rev() {
        if let Some((x, y, z)) = sample(i) {
            if let Some(v) = projector.project(view_from_calib, [x, y + y_off, z + z_off]) {
                out.push(v);
            }
        }
    }
}
