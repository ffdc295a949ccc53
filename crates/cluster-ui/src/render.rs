//! Render driver seam

use scene::{SceneView, SystemStatus};
use tracing::{debug, info};
use vision::VideoFrame;

/// Frames between periodic draw summaries
const SUMMARY_INTERVAL: u64 = 100;

/// Whatever puts the scene on screen. The UI loop calls it once per cycle.
pub trait RenderDriver {
    /// Draw one frame; `frame` is the latest road camera image, if any
    fn draw(&mut self, view: &SceneView<'_>, frame: Option<&VideoFrame>);

    /// New framebuffer size if the surface changed since the last call
    fn resized(&mut self) -> Option<(u32, u32)> {
        None
    }

    /// Whether the screen was touched since the last call
    fn take_touch(&mut self) -> bool {
        false
    }
}

/// Headless renderer that logs what would be drawn
#[derive(Debug, Default)]
pub struct TraceRenderer {
    frames: u64,
    last_status: Option<SystemStatus>,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderDriver for TraceRenderer {
    fn draw(&mut self, view: &SceneView<'_>, frame: Option<&VideoFrame>) {
        self.frames += 1;

        if self.last_status != Some(view.status()) {
            info!("Status {:?}", view.status());
            self.last_status = Some(view.status());
        }

        if self.frames % SUMMARY_INTERVAL == 0 {
            debug!(
                frame = self.frames,
                speed = view.display_speed(),
                path_vertices = view.path().len(),
                leads = view.leads().count(),
                video = frame.map(|f| f.sequence),
                "Scene summary"
            );
        }
    }
}
