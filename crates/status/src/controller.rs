//! Status controller

use projection::{CameraVariant, HardwareProfile};
use scene::{Scene, SystemStatus};
use serde::Serialize;
use telemetry::messages::AlertStatus;
use tracing::info;

/// Lifecycle change detected during one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    /// Went onroad; projection and video must switch to `camera`
    Onroad { camera: CameraVariant },
    /// Went offroad; video should be disconnected
    Offroad,
}

/// Status for the current alert, pedal and cruise state.
///
/// Critical alerts win over prompts, which win over braking, then
/// adaptive cruise, then plain engagement.
pub fn derive_status(scene: &Scene) -> SystemStatus {
    match scene.controls.alert_status {
        AlertStatus::Critical => SystemStatus::Alert,
        AlertStatus::UserPrompt => SystemStatus::Warning,
        AlertStatus::Normal if scene.car.brake_pressed => SystemStatus::Braking,
        AlertStatus::Normal if scene.car.cruise_acc_status => SystemStatus::Cruising,
        AlertStatus::Normal if scene.controls.enabled => SystemStatus::Engaged,
        AlertStatus::Normal => SystemStatus::Disengaged,
    }
}

/// Road camera to use, wide only when fitted and enabled
pub fn select_camera(hardware: HardwareProfile, enable_wide_camera: bool) -> CameraVariant {
    if hardware.has_wide_camera() && enable_wide_camera {
        CameraVariant::Wide
    } else {
        CameraVariant::Narrow
    }
}

/// Tracks the driving status and the started edge
#[derive(Debug, Clone, Default)]
pub struct StatusController {
    status: SystemStatus,
    started_prev: bool,
    /// Frame at which the last onroad transition happened
    started_frame: u64,
}

impl StatusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    pub fn started_frame(&self) -> u64 {
        self.started_frame
    }

    pub fn is_onroad(&self) -> bool {
        self.started_prev
    }

    /// Run once per cycle after the scene has been updated.
    ///
    /// `controls_fresh` tells whether a controls state arrived this cycle;
    /// status is only re-derived then, and only while started.
    pub fn update(
        &mut self,
        scene: &Scene,
        controls_fresh: bool,
        frame: u64,
        hardware: HardwareProfile,
        enable_wide_camera: bool,
    ) -> Option<Transition> {
        if scene.started && controls_fresh {
            self.status = derive_status(scene);
        }

        if scene.started == self.started_prev {
            return None;
        }
        self.started_prev = scene.started;

        if scene.started {
            self.status = SystemStatus::Disengaged;
            self.started_frame = frame;
            let camera = select_camera(hardware, enable_wide_camera);
            info!("Going onroad at frame {} with {:?} camera", frame, camera);
            Some(Transition::Onroad { camera })
        } else {
            info!("Going offroad");
            Some(Transition::Offroad)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scene(alert: AlertStatus, brake: bool, cruise: bool, enabled: bool) -> Scene {
        let mut s = Scene::default();
        s.controls.alert_status = alert;
        s.controls.enabled = enabled;
        s.car.brake_pressed = brake;
        s.car.cruise_acc_status = cruise;
        s.started = true;
        s
    }

    #[test]
    fn test_critical_beats_brake() {
        let s = scene(AlertStatus::Critical, true, true, true);
        assert_eq!(derive_status(&s), SystemStatus::Alert);
    }

    #[test]
    fn test_prompt_beats_brake() {
        let s = scene(AlertStatus::UserPrompt, true, false, true);
        assert_eq!(derive_status(&s), SystemStatus::Warning);
    }

    #[test]
    fn test_cruise_beats_engaged() {
        let s = scene(AlertStatus::Normal, false, true, true);
        assert_eq!(derive_status(&s), SystemStatus::Cruising);

        let s = scene(AlertStatus::Normal, true, true, true);
        assert_eq!(derive_status(&s), SystemStatus::Braking);
    }

    #[test]
    fn test_enabled_or_not() {
        assert_eq!(
            derive_status(&scene(AlertStatus::Normal, false, false, true)),
            SystemStatus::Engaged
        );
        assert_eq!(
            derive_status(&scene(AlertStatus::Normal, false, false, false)),
            SystemStatus::Disengaged
        );
    }

    #[test]
    fn test_onroad_edge_resets_status() {
        let mut ctl = StatusController::new();
        let mut s = scene(AlertStatus::Normal, false, false, true);
        s.started = false;

        assert_eq!(ctl.update(&s, true, 1, HardwareProfile::Tici, false), None);
        assert_eq!(ctl.status(), SystemStatus::Disengaged);

        s.started = true;
        let t = ctl.update(&s, true, 2, HardwareProfile::Tici, false);
        assert_eq!(t, Some(Transition::Onroad { camera: CameraVariant::Narrow }));
        // Edge wins over the freshly derived status
        assert_eq!(ctl.status(), SystemStatus::Disengaged);
        assert_eq!(ctl.started_frame(), 2);
        assert!(ctl.is_onroad());

        assert_eq!(ctl.update(&s, true, 3, HardwareProfile::Tici, false), None);
        assert_eq!(ctl.status(), SystemStatus::Engaged);

        s.started = false;
        assert_eq!(ctl.update(&s, false, 4, HardwareProfile::Tici, false), Some(Transition::Offroad));
        assert!(!ctl.is_onroad());
    }

    #[test]
    fn test_status_held_without_fresh_controls() {
        let mut ctl = StatusController::new();
        let mut s = scene(AlertStatus::Critical, false, false, true);
        ctl.update(&s, true, 1, HardwareProfile::Pc, false);
        ctl.update(&s, true, 2, HardwareProfile::Pc, false);
        assert_eq!(ctl.status(), SystemStatus::Alert);

        s.controls.alert_status = AlertStatus::Normal;
        ctl.update(&s, false, 3, HardwareProfile::Pc, false);
        assert_eq!(ctl.status(), SystemStatus::Alert);
    }

    #[test]
    fn test_wide_camera_selection() {
        assert_eq!(select_camera(HardwareProfile::Tici, true), CameraVariant::Wide);
        assert_eq!(select_camera(HardwareProfile::Tici, false), CameraVariant::Narrow);
        assert_eq!(select_camera(HardwareProfile::Eon, true), CameraVariant::Narrow);

        let mut ctl = StatusController::new();
        let s = scene(AlertStatus::Normal, false, false, false);
        assert_eq!(
            ctl.update(&s, false, 7, HardwareProfile::Tici, true),
            Some(Transition::Onroad { camera: CameraVariant::Wide })
        );
    }

    proptest! {
        #[test]
        fn test_critical_always_alert(brake: bool, cruise: bool, enabled: bool) {
            let s = scene(AlertStatus::Critical, brake, cruise, enabled);
            prop_assert_eq!(derive_status(&s), SystemStatus::Alert);
        }
    }
}
