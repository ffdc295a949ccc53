//! Lead vehicle markers

use nalgebra::Matrix3;
use projection::{Projector, Vertex};
use serde::Serialize;
use telemetry::messages::LeadData;

/// Height of the road camera above the ground (meters)
pub const CAMERA_HEIGHT: f32 = 1.22;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LeadSource {
    Radar,
    #[default]
    Vision,
}

/// One lead vehicle as drawn on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeadMarker {
    /// Screen position, `None` when it does not project on screen
    pub vertex: Option<Vertex>,
    /// Radar slot holds a tracked vehicle
    pub valid: bool,
    pub source: LeadSource,
    pub d_rel: f32,
    pub y_rel: f32,
    pub v_rel: f32,
}

impl LeadMarker {
    /// Build a marker from a radar slot. `path_z` is the path height at the
    /// lead's distance.
    pub fn from_lead(
        projector: &Projector,
        view_from_calib: &Matrix3<f32>,
        lead: &LeadData,
        path_z: f32,
    ) -> Self {
        Self {
            vertex: projector.project(view_from_calib, lead_point(lead, path_z)),
            valid: lead.status,
            source: if lead.radar {
                LeadSource::Radar
            } else {
                LeadSource::Vision
            },
            d_rel: lead.d_rel,
            y_rel: lead.y_rel,
            v_rel: lead.v_rel,
        }
    }
}

/// Car-frame point of a lead; radar reports lateral offset left positive
fn lead_point(lead: &LeadData, path_z: f32) -> [f32; 3] {
    [lead.d_rel, -lead.y_rel, path_z + CAMERA_HEIGHT]
}

/// Both lead markers plus the radar-only position of lead one
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeadMarkers {
    pub one: LeadMarker,
    pub two: LeadMarker,
    /// Lead one position when it is tracked by radar
    pub radar_vertex: Option<Vertex>,
}

impl LeadMarkers {
    pub fn update(
        &mut self,
        projector: &Projector,
        view_from_calib: &Matrix3<f32>,
        one: &LeadData,
        two: &LeadData,
        path_z_one: f32,
        path_z_two: f32,
    ) {
        self.one = LeadMarker::from_lead(projector, view_from_calib, one, path_z_one);
        self.two = LeadMarker::from_lead(projector, view_from_calib, two, path_z_two);
        self.radar_vertex = if one.status && one.radar {
            self.one.vertex
        } else {
            None
        };
    }

    /// Lead two is shown only when tracked and clearly apart from lead one
    pub fn should_draw_lead_two(&self, separation_m: f32) -> bool {
        self.two.valid && (self.one.d_rel - self.two.d_rel).abs() > separation_m
    }

    /// Markers that should be drawn this frame
    pub fn drawable(&self, separation_m: f32) -> impl Iterator<Item = &LeadMarker> {
        let one = self.one.valid.then_some(&self.one);
        let two = self.should_draw_lead_two(separation_m).then_some(&self.two);
        one.into_iter().chain(two)
    }
}
