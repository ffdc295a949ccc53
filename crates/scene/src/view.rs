//! Read-only scene access for the renderer

use nalgebra::Matrix4;
use projection::Vertex;
use telemetry::messages::LateralControlKind;

use crate::config::{SceneConfig, UiSettings};
use crate::lead::LeadMarker;
use crate::scene::{Scene, SystemStatus};

const MS_TO_KPH: f32 = 3.6;
const MS_TO_MPH: f32 = 2.236_936_3;
const KPH_TO_MPH: f32 = 0.6225;

/// Cruise speed value meaning "not set"
const SET_SPEED_NA: f32 = 255.0;

/// Speed limits at or below this are not checked (km/h)
const MIN_CHECKED_LIMIT: f32 = 29.0;

/// Scene borrowed for one render pass
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    scene: &'a Scene,
    status: SystemStatus,
    settings: &'a UiSettings,
    config: &'a SceneConfig,
    frame_transform: Matrix4<f32>,
}

impl<'a> SceneView<'a> {
    pub fn new(
        scene: &'a Scene,
        status: SystemStatus,
        settings: &'a UiSettings,
        config: &'a SceneConfig,
        frame_transform: Matrix4<f32>,
    ) -> Self {
        Self {
            scene,
            status,
            settings,
            config,
            frame_transform,
        }
    }

    /// Full scene for fields without a dedicated accessor
    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    /// Clip-space transform for the video texture quad
    pub fn frame_transform(&self) -> &Matrix4<f32> {
        &self.frame_transform
    }

    /// Whether model geometry and leads can be drawn
    pub fn world_objects_visible(&self) -> bool {
        self.scene.world_objects_visible
    }

    pub fn lane_lines(&self) -> impl Iterator<Item = (&'a [Vertex], f32)> {
        let scene = self.scene;
        let g = &scene.geometry;
        g.lane_line_vertices
            .iter()
            .map(|v| v.as_slice())
            .zip(g.lane_line_probs.iter().copied())
    }

    pub fn road_edges(&self) -> impl Iterator<Item = (&'a [Vertex], f32)> {
        let scene = self.scene;
        let g = &scene.geometry;
        g.road_edge_vertices
            .iter()
            .map(|v| v.as_slice())
            .zip(g.road_edge_stds.iter().copied())
    }

    pub fn path(&self) -> &'a [Vertex] {
        self.scene.geometry.track_vertices.as_slice()
    }

    /// Lead markers to draw this frame
    pub fn leads(&self) -> impl Iterator<Item = &'a LeadMarker> {
        let scene = self.scene;
        scene.leads.drawable(self.config.lead_separation_m)
    }

    pub fn is_metric(&self) -> bool {
        self.settings.is_metric
    }

    /// Vehicle speed in display units, never negative
    pub fn display_speed(&self) -> f32 {
        let factor = if self.settings.is_metric {
            MS_TO_KPH
        } else {
            MS_TO_MPH
        };
        (self.scene.car.v_ego * factor).max(0.0)
    }

    /// Max cruise speed in display units, `None` while cruise is not set
    pub fn cruise_max_speed(&self) -> Option<f32> {
        let c = &self.scene.controls;
        let set = c.enabled && c.v_cruise != 0.0 && c.v_cruise != SET_SPEED_NA;
        if !set {
            return None;
        }
        Some(if self.settings.is_metric {
            c.v_cruise
        } else {
            c.v_cruise * KPH_TO_MPH
        })
    }

    /// Whether the vehicle is faster than the camera speed limit plus the
    /// configured tolerance
    pub fn over_speed_limit(&self) -> bool {
        let limit = self.scene.controls.limit_speed_camera;
        if limit <= MIN_CHECKED_LIMIT {
            return false;
        }
        let tolerance = (limit * 0.01 * self.settings.speed_limit_offset as f32).round();
        limit + tolerance + 1.0 < self.scene.car.v_ego * MS_TO_KPH
    }

    /// Blind-spot flags, both false unless the warning is enabled
    pub fn blind_spots(&self) -> (bool, bool) {
        if !self.settings.blind_spot_detect {
            return (false, false);
        }
        (self.scene.car.left_blindspot, self.scene.car.right_blindspot)
    }

    /// Active lateral controller and its output scale
    pub fn lateral_control(&self) -> (LateralControlKind, f32) {
        let controls = &self.scene.controls;
        (controls.lateral_control, controls.output_scale)
    }

    /// Whether the turn signal arrow is in its visible phase
    pub fn blinker_lit(&self) -> bool {
        let car = &self.scene.car;
        (car.left_blinker || car.right_blinker) && self.scene.blinker.lit()
    }
}
