//! Cluster UI Scene
//!
//! Aggregates independently updated telemetry topics into one scene per frame:
//! - Lane line, road edge and path ribbons projected to screen space
//! - Lead vehicle markers
//! - Scalar display state (speed, alerts, gear, blind spot, tire pressure, ...)
//!
//! The render side only ever sees a borrowed [`SceneView`].

pub mod aggregator;
pub mod config;
pub mod lead;
pub mod line;
pub mod scene;
pub mod view;

pub use aggregator::SceneAggregator;
pub use config::{SceneConfig, UiSettings};
pub use lead::{LeadMarker, LeadMarkers, LeadSource};
pub use line::{build_ribbon, get_path_length_idx, LineVertices, MAX_LINE_VERTICES, TRAJECTORY_SIZE};
pub use scene::{BlinkerAnimation, Scene, SystemStatus};
pub use view::SceneView;
