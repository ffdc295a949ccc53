//! Per-topic scene updates
//!
//! Each cycle the aggregator looks at the subscription store and applies the
//! rule of every topic that received a new message. Topics without news keep
//! their previous scene fields.

use nalgebra::Matrix3;
use projection::{CameraVariant, HardwareProfile, Projector};
use telemetry::messages::{
    CarState, ControlsState, DeviceState, LiveCalibration, ModelV2, PandaType, RadarState,
    RoadCameraState, SensorEvent, SensorKind, UbloxGnss, XyztData,
};
use telemetry::{SubMaster, UI_FREQ};
use tracing::{debug, info};

use crate::config::{SceneConfig, UiSettings};
use crate::line::{build_ribbon, get_path_length_idx, LineVertices, TRAJECTORY_SIZE};
use crate::scene::{Scene, SystemStatus};
use crate::view::SceneView;

/// Closest draw distance for model geometry (meters)
pub const MIN_DRAW_DISTANCE: f32 = 10.0;
/// Furthest draw distance for model geometry (meters)
pub const MAX_DRAW_DISTANCE: f32 = 100.0;

const LANE_LINE_OFFSET: f32 = 0.025;
const ROAD_EDGE_OFFSET: f32 = 0.025;
const PATH_OFFSET: f32 = 0.25;
const PATH_HEIGHT: f32 = 1.22;

/// Single writer of the [`Scene`]
pub struct SceneAggregator {
    scene: Scene,
    projector: Projector,
    hardware: HardwareProfile,
    config: SceneConfig,
    settings: UiSettings,
}

impl SceneAggregator {
    /// Create an aggregator projecting through the narrow camera
    pub fn new(
        hardware: HardwareProfile,
        config: SceneConfig,
        settings: UiSettings,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            scene: Scene::default(),
            projector: Projector::new(CameraVariant::Narrow, hardware, width, height),
            hardware,
            config,
            settings,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn hardware(&self) -> HardwareProfile {
        self.hardware
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn settings(&self) -> &UiSettings {
        &self.settings
    }

    /// Replace the user settings after a reload
    pub fn apply_settings(&mut self, settings: UiSettings) {
        if settings != self.settings {
            debug!("UI settings changed: {:?}", settings);
            self.settings = settings;
        }
    }

    /// Rebuild the projection for another camera. Only called at onroad
    /// transitions.
    pub fn select_camera(&mut self, variant: CameraVariant) {
        let (width, height) = self.projector.framebuffer_size();
        self.projector = Projector::new(variant, self.hardware, width, height);
        info!("Projecting through {:?} camera", variant);
    }

    /// Rebuild the projection for a new framebuffer size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projector = Projector::new(self.projector.variant(), self.hardware, width, height);
        debug!("Framebuffer resized to {}x{}", width, height);
    }

    /// Borrow the scene for one render pass
    pub fn view(&self, status: SystemStatus) -> SceneView<'_> {
        SceneView::new(
            &self.scene,
            status,
            &self.settings,
            &self.config,
            self.projector.frame_transform(),
        )
    }

    /// Apply every topic that received a message during the last store update
    pub fn update(&mut self, sm: &SubMaster) {
        let scene = &mut self.scene;
        let projector = &self.projector;

        if let Some(cs) = sm.controls_state.fresh() {
            update_controls_state(scene, cs);
        }
        if let Some(cs) = sm.car_state.fresh() {
            update_car_state(scene, cs);
        }
        if let Some(lp) = sm.live_parameters.fresh() {
            scene.live_params = *lp;
        }
        if let Some(radar) = sm.radar_state.fresh() {
            let path = sm.model.received().then(|| &sm.model.get().position);
            update_leads(scene, projector, radar, path);
        }
        if let Some(cal) = sm.live_calibration.fresh() {
            update_calibration(scene, cal);
        }
        if let Some(model) = sm.model.fresh() {
            update_model(scene, projector, model, sm.radar_state.get());
        }
        if let Some(ds) = sm.device_state.fresh() {
            update_device_state(scene, ds);
        }
        if let Some(ps) = sm.panda_state.fresh() {
            scene.panda.panda_type = ps.panda_type;
            scene.panda.ignition = ps.ignition_line || ps.ignition_can;
            scene.panda.controls_allowed = ps.controls_allowed;
        } else if sm.frame().saturating_sub(sm.panda_state.rcv_frame())
            > self.config.panda_timeout_frames
        {
            if scene.panda.panda_type != PandaType::Unknown {
                debug!("Panda state stale, hardware type unknown");
            }
            scene.panda.panda_type = PandaType::Unknown;
        }
        if let Some(gnss) = sm.ublox_gnss.fresh() {
            update_gnss(scene, gnss);
        }
        if let Some(gps) = sm.gps_location.fresh() {
            scene.gps = *gps;
        }
        if let Some(cp) = sm.car_params.fresh() {
            scene.car_params = cp.clone();
        }
        if let Some(lp) = sm.lateral_plan.fresh() {
            scene.lateral_plan = *lp;
        }
        if let Some(map) = sm.live_map_data.fresh() {
            scene.map = *map;
        }
        if let Some(events) = sm.sensor_events.fresh() {
            if !scene.started {
                update_motion(scene, events);
            }
        }
        if let Some(cam) = sm.road_camera_state.fresh() {
            scene.light_sensor = light_sensor(cam, self.hardware);
        }

        scene.started = sm.device_state.get().started
            && (scene.panda.ignition || self.settings.openpilot_view_enabled);

        if sm.frame() % (UI_FREQ / 2) == 0 {
            scene.engageable = sm.controls_state.get().engageable;
            scene.dm_active = sm.driver_monitoring_state.get().is_active_mode;
        }

        if scene.car.left_blinker || scene.car.right_blinker {
            scene.blinker.advance();
        }
    }
}

fn update_controls_state(scene: &mut Scene, cs: &ControlsState) {
    let c = &mut scene.controls;
    c.enabled = cs.enabled;
    c.alert_status = cs.alert_status;
    c.alert_size = cs.alert_size;
    c.alert_text1.clone_from(&cs.alert_text1);
    c.alert_text2.clone_from(&cs.alert_text2);
    c.alert_type.clone_from(&cs.alert_type);
    c.alert_sound = cs.alert_sound;
    c.alert_text_msg1.clone_from(&cs.alert_text_msg1);
    c.alert_text_msg2.clone_from(&cs.alert_text_msg2);
    c.lateral_control = cs.lateral_control_state.kind();
    c.output_scale = cs.lateral_control_state.output();
    c.v_cruise = cs.v_cruise;
    c.limit_speed_camera = cs.limit_speed_camera;
    c.limit_speed_camera_dist = cs.limit_speed_camera_dist;
    c.map_sign = cs.map_sign;
    c.steer_ratio = cs.steer_ratio;
    c.dynamic_tr_mode = cs.dynamic_tr_mode;
    c.dynamic_tr_value = cs.dynamic_tr_value;
}

fn update_car_state(scene: &mut Scene, cs: &CarState) {
    if cs.left_blinker != scene.car.left_blinker || cs.right_blinker != scene.car.right_blinker {
        scene.blinker.restart();
    }

    let c = &mut scene.car;
    c.v_ego = cs.v_ego;
    c.brake_pressed = cs.brake_pressed;
    c.brake_lights = cs.brake_lights;
    c.gear_shifter = cs.gear_shifter;
    c.left_blinker = cs.left_blinker;
    c.right_blinker = cs.right_blinker;
    c.left_blindspot = cs.left_blindspot;
    c.right_blindspot = cs.right_blindspot;
    c.tpms = cs.tpms;
    c.radar_distance = cs.radar_distance;
    c.stand_still = cs.stand_still;
    c.v_set_dis = cs.v_set_dis;
    c.cruise_acc_status = cs.cruise_acc_status;
    c.steering_angle_deg = cs.steering_angle_deg;
    c.cruise_gap_set = cs.cruise_gap_set;
    c.cruise_state = cs.cruise_state;
}

fn update_calibration(scene: &mut Scene, cal: &LiveCalibration) {
    scene.world_objects_visible = true;
    scene.calibration.update(cal.rpy_calib);
}

/// Path height at a distance along the model path
fn path_height_at(path: Option<&XyztData>, distance: f32) -> f32 {
    path.and_then(|p| p.z.get(get_path_length_idx(&p.x, distance)).copied())
        .unwrap_or(0.0)
}

fn update_leads(
    scene: &mut Scene,
    projector: &Projector,
    radar: &RadarState,
    path: Option<&XyztData>,
) {
    let Some(calib) = scene.calibration.view_from_calib().copied() else {
        return;
    };

    let z_one = path_height_at(path, radar.lead_one.d_rel);
    let z_two = path_height_at(path, radar.lead_two.d_rel);
    scene
        .leads
        .update(projector, &calib, &radar.lead_one, &radar.lead_two, z_one, z_two);
}

fn update_model(scene: &mut Scene, projector: &Projector, model: &ModelV2, radar: &RadarState) {
    let Some(calib) = scene.calibration.view_from_calib().copied() else {
        return;
    };
    let geometry = &mut scene.geometry;
    let position = &model.position;

    let mut max_distance = position
        .x
        .get(TRAJECTORY_SIZE - 1)
        .or(position.x.last())
        .copied()
        .unwrap_or(MIN_DRAW_DISTANCE)
        .clamp(MIN_DRAW_DISTANCE, MAX_DRAW_DISTANCE);

    let lane_xs = model.lane_lines.first().map(|l| l.x.as_slice()).unwrap_or(&[]);
    let max_idx = get_path_length_idx(lane_xs, max_distance);

    for (i, out) in geometry.lane_line_vertices.iter_mut().enumerate() {
        let prob = model.lane_line_probs.get(i).copied().unwrap_or(0.0);
        geometry.lane_line_probs[i] = prob;
        let y_off = LANE_LINE_OFFSET * prob;
        ribbon_or_clear(projector, &calib, model.lane_lines.get(i), y_off, 0.0, max_idx, out);
    }

    for (i, out) in geometry.road_edge_vertices.iter_mut().enumerate() {
        geometry.road_edge_stds[i] = model.road_edge_stds.get(i).copied().unwrap_or(0.0);
        let edge = model.road_edges.get(i);
        ribbon_or_clear(projector, &calib, edge, ROAD_EDGE_OFFSET, 0.0, max_idx, out);
    }

    // Stop the path short of the lead vehicle
    let lead = &radar.lead_one;
    if lead.status {
        let lead_d = lead.d_rel * 2.0;
        max_distance = (lead_d - (lead_d * 0.35).min(10.0)).clamp(0.0, max_distance);
    }
    geometry.max_distance = max_distance;

    let max_idx = get_path_length_idx(&position.x, max_distance);
    build_ribbon(
        projector,
        &calib,
        position,
        PATH_OFFSET,
        PATH_HEIGHT,
        max_idx,
        &mut geometry.track_vertices,
    );
}

fn ribbon_or_clear(
    projector: &Projector,
    calib: &Matrix3<f32>,
    line: Option<&XyztData>,
    y_off: f32,
    z_off: f32,
    max_idx: usize,
    out: &mut LineVertices,
) {
    match line {
        Some(line) => build_ribbon(projector, calib, line, y_off, z_off, max_idx, out),
        None => out.clear(),
    }
}

/// Mean over the first four entries, 0 when empty
fn four_core_mean(values: &[f32]) -> f32 {
    let cores = &values[..values.len().min(4)];
    if cores.is_empty() {
        0.0
    } else {
        cores.iter().sum::<f32>() / cores.len() as f32
    }
}

fn update_device_state(scene: &mut Scene, ds: &DeviceState) {
    let d = &mut scene.device;
    d.cpu_usage_percent = four_core_mean(&ds.cpu_usage_percent);
    d.cpu_temp_c = four_core_mean(&ds.cpu_temp_c);
    d.battery_temp_c = ds.battery_temp_c;
    d.ambient_temp_c = ds.ambient_temp_c;
    d.fan_speed_percent = ds.fan_speed_percent_desired;
    d.battery_percent = ds.battery_percent;
}

fn update_gnss(scene: &mut Scene, gnss: &UbloxGnss) {
    if let Some(report) = gnss.measurement_report {
        scene.satellite_count = report.num_meas;
    }
}

fn update_motion(scene: &mut Scene, events: &[SensorEvent]) {
    for event in events {
        match event.sensor {
            SensorKind::Acceleration => {
                if let Some(&a) = event.v.get(2) {
                    scene.motion.accel = a;
                }
            }
            SensorKind::GyroUncalibrated => {
                if let Some(&g) = event.v.get(1) {
                    scene.motion.gyro = g;
                }
            }
            _ => {}
        }
    }
}

/// Ambient light estimate from road camera exposure, 1 = bright
fn light_sensor(cam: &RoadCameraState, hardware: HardwareProfile) -> f32 {
    let ev = cam.gain * cam.integ_lines as f32;
    (1.0 - ev / hardware.max_exposure()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use crate::scene::MotionSample;
    use telemetry::messages::*;
    use telemetry::Message;

    fn aggregator() -> SceneAggregator {
        SceneAggregator::new(
            HardwareProfile::Tici,
            SceneConfig::default(),
            UiSettings::default(),
            1920,
            1080,
        )
    }

    fn line(y: f32) -> XyztData {
        XyztData {
            x: (0..TRAJECTORY_SIZE).map(|i| 2.0 + i as f32 * 3.5).collect(),
            y: vec![y; TRAJECTORY_SIZE],
            z: vec![0.0; TRAJECTORY_SIZE],
            t: vec![0.0; TRAJECTORY_SIZE],
        }
    }

    fn model() -> ModelV2 {
        ModelV2 {
            position: line(0.0),
            lane_lines: vec![line(-3.5), line(-1.75), line(1.75), line(3.5)],
            lane_line_probs: vec![0.2, 0.9, 0.9, 0.2],
            road_edges: vec![line(-5.0), line(5.0)],
            road_edge_stds: vec![0.4, 0.6],
            ..Default::default()
        }
    }

    fn calibration() -> Message {
        Message::LiveCalibration(LiveCalibration { rpy_calib: [0.0, 0.0, 0.0] })
    }

    fn started_device() -> Message {
        Message::DeviceState(DeviceState {
            started: true,
            ..Default::default()
        })
    }

    fn ignition() -> Message {
        Message::PandaState(PandaState {
            panda_type: PandaType::Dos,
            ignition_can: true,
            ..Default::default()
        })
    }

    fn step(agg: &mut SceneAggregator, sm: &mut SubMaster, msgs: Vec<Message>) {
        sm.update(msgs, Instant::now());
        agg.update(sm);
    }

    #[test]
    fn test_car_state_leaves_other_topics_untouched() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        step(
            &mut agg,
            &mut sm,
            vec![
                calibration(),
                Message::ModelV2(model()),
                Message::ControlsState(ControlsState {
                    enabled: true,
                    alert_text1: "Take Control".into(),
                    ..Default::default()
                }),
                ignition(),
                Message::LiveParameters(LiveParameters {
                    angle_offset_deg: 1.5,
                    stiffness_factor: 0.9,
                    steer_ratio: 15.2,
                    ..Default::default()
                }),
                Message::GpsLocationExternal(GpsLocation {
                    accuracy: 3.0,
                    altitude: 120.0,
                    bearing_deg: 270.0,
                }),
                Message::LateralPlan(LateralPlan {
                    lane_width: 3.6,
                    d_prob: 0.8,
                    laneless_mode: true,
                    ..Default::default()
                }),
                Message::LiveMapData(LiveMapData {
                    speed_limit: 27.0,
                    turn_info: 2,
                    ..Default::default()
                }),
                Message::RoadCameraState(RoadCameraState {
                    gain: 1.0,
                    integ_lines: 500,
                }),
            ],
        );
        let before = agg.scene().clone();
        assert_eq!(before.live_params.steer_ratio, 15.2);
        assert!(before.panda.ignition);
        assert!(before.light_sensor > 0.0 && before.light_sensor < 1.0);

        let car = CarState {
            v_ego: 22.0,
            gear_shifter: GearShifter::Drive,
            ..Default::default()
        };
        step(&mut agg, &mut sm, vec![Message::CarState(car)]);
        let after = agg.scene();

        assert_eq!(after.car.v_ego, 22.0);
        assert_eq!(after.car.gear_shifter, GearShifter::Drive);

        let mut expected = before;
        expected.car = after.car.clone();
        expected.blinker = after.blinker;
        assert_eq!(after, &expected);
    }

    #[test]
    fn test_controls_state_records_lateral_controller() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        step(
            &mut agg,
            &mut sm,
            vec![Message::ControlsState(ControlsState {
                lateral_control_state: LateralControlState::Lqr(LqrState {
                    output: 0.75,
                    saturated: false,
                }),
                ..Default::default()
            })],
        );

        let controls = &agg.scene().controls;
        assert_eq!(controls.lateral_control, LateralControlKind::Lqr);
        assert_eq!(controls.output_scale, 0.75);
        assert_eq!(
            agg.view(SystemStatus::Engaged).lateral_control(),
            (LateralControlKind::Lqr, 0.75)
        );
    }

    #[test]
    fn test_model_ignored_until_calibrated() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();

        step(&mut agg, &mut sm, vec![Message::ModelV2(model())]);
        assert!(agg.scene().geometry.track_vertices.is_empty());
        assert!(!agg.scene().world_objects_visible);

        step(&mut agg, &mut sm, vec![calibration(), Message::ModelV2(model())]);
        let g = &agg.scene().geometry;
        assert!(agg.scene().world_objects_visible);
        assert!(!g.track_vertices.is_empty());
        assert!(g.lane_line_vertices.iter().all(|l| !l.is_empty()));
        assert_eq!(g.lane_line_probs, [0.2, 0.9, 0.9, 0.2]);
        assert_eq!(g.road_edge_stds, [0.4, 0.6]);
    }

    #[test]
    fn test_missing_lane_lines_cleared() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        step(&mut agg, &mut sm, vec![calibration(), Message::ModelV2(model())]);

        let mut short = model();
        short.lane_lines.truncate(2);
        step(&mut agg, &mut sm, vec![Message::ModelV2(short)]);

        let g = &agg.scene().geometry;
        assert!(!g.lane_line_vertices[1].is_empty());
        assert!(g.lane_line_vertices[2].is_empty());
        assert_eq!(g.lane_line_probs[2], 0.9);
    }

    #[test]
    fn test_path_clamped_by_lead() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        step(&mut agg, &mut sm, vec![calibration(), Message::ModelV2(model())]);
        assert_eq!(agg.scene().geometry.max_distance, MAX_DRAW_DISTANCE);
        let free_path = agg.scene().geometry.track_vertices.len();

        let radar = RadarState {
            lead_one: LeadData {
                status: true,
                d_rel: 10.0,
                ..Default::default()
            },
            ..Default::default()
        };
        step(
            &mut agg,
            &mut sm,
            vec![Message::RadarState(radar), Message::ModelV2(model())],
        );
        // lead_d = 20, minus min(7, 10)
        assert!((agg.scene().geometry.max_distance - 13.0).abs() < 1e-4);
        assert!(agg.scene().geometry.track_vertices.len() < free_path);
    }

    #[test]
    fn test_lead_markers_follow_radar() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        let radar = RadarState {
            lead_one: LeadData {
                status: true,
                d_rel: 30.0,
                radar: true,
                ..Default::default()
            },
            lead_two: LeadData {
                status: true,
                d_rel: 31.0,
                ..Default::default()
            },
        };
        step(&mut agg, &mut sm, vec![calibration(), Message::ModelV2(model())]);
        step(&mut agg, &mut sm, vec![Message::RadarState(radar)]);

        let leads = &agg.scene().leads;
        assert!(leads.one.valid && leads.two.valid);
        assert!(leads.radar_vertex.is_some());
        assert!(!leads.should_draw_lead_two(agg.config().lead_separation_m));
    }

    #[test]
    fn test_panda_goes_stale() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        step(&mut agg, &mut sm, vec![ignition()]);
        assert_eq!(agg.scene().panda.panda_type, PandaType::Dos);
        assert!(agg.scene().panda.ignition);

        for _ in 0..agg.config().panda_timeout_frames {
            step(&mut agg, &mut sm, vec![]);
        }
        assert_eq!(agg.scene().panda.panda_type, PandaType::Dos);

        step(&mut agg, &mut sm, vec![]);
        assert_eq!(agg.scene().panda.panda_type, PandaType::Unknown);
        // Ignition keeps its last value
        assert!(agg.scene().panda.ignition);
    }

    #[test]
    fn test_started_requires_ignition_or_view_mode() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();

        step(&mut agg, &mut sm, vec![started_device()]);
        assert!(!agg.scene().started);

        step(&mut agg, &mut sm, vec![ignition()]);
        assert!(agg.scene().started);

        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        agg.apply_settings(UiSettings {
            openpilot_view_enabled: true,
            ..Default::default()
        });
        step(&mut agg, &mut sm, vec![started_device()]);
        assert!(agg.scene().started);
    }

    #[test]
    fn test_motion_sensors_only_offroad() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        let events = |a: f32, g: f32| {
            Message::SensorEvents(vec![
                SensorEvent { sensor: SensorKind::Acceleration, v: vec![0.0, 0.0, a] },
                SensorEvent { sensor: SensorKind::GyroUncalibrated, v: vec![0.0, g, 0.0] },
                SensorEvent { sensor: SensorKind::Acceleration, v: vec![] },
            ])
        };

        step(&mut agg, &mut sm, vec![events(9.8, 0.1)]);
        assert_eq!(agg.scene().motion, MotionSample { accel: 9.8, gyro: 0.1 });

        step(&mut agg, &mut sm, vec![started_device(), ignition()]);
        step(&mut agg, &mut sm, vec![events(1.0, 1.0)]);
        assert_eq!(agg.scene().motion.accel, 9.8);
    }

    #[test]
    fn test_light_sensor_normalized() {
        let cam = |gain: f32, lines: u32| RoadCameraState { gain, integ_lines: lines };

        // Tici ceiling is 1904 * 10 / 6
        let dark = light_sensor(&cam(10.0, 1904), HardwareProfile::Tici);
        assert_eq!(dark, 0.0);
        let bright = light_sensor(&cam(0.0, 0), HardwareProfile::Tici);
        assert_eq!(bright, 1.0);
        let half = light_sensor(&cam(1.0, 2704), HardwareProfile::Eon);
        assert!((half - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_device_summary_averages_four_cores() {
        let mut scene = Scene::default();
        update_device_state(
            &mut scene,
            &DeviceState {
                cpu_usage_percent: vec![10.0, 20.0, 30.0, 40.0, 100.0],
                cpu_temp_c: vec![],
                battery_percent: 80.0,
                ..Default::default()
            },
        );
        assert_eq!(scene.device.cpu_usage_percent, 25.0);
        assert_eq!(scene.device.cpu_temp_c, 0.0);
        assert_eq!(scene.device.battery_percent, 80.0);
    }

    #[test]
    fn test_engageable_sampled_at_two_hz() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        let controls = Message::ControlsState(ControlsState {
            engageable: true,
            ..Default::default()
        });

        step(&mut agg, &mut sm, vec![controls]);
        assert!(!agg.scene().engageable);

        for _ in 1..(UI_FREQ / 2) {
            step(&mut agg, &mut sm, vec![]);
        }
        assert_eq!(sm.frame(), UI_FREQ / 2);
        assert!(agg.scene().engageable);
    }

    #[test]
    fn test_blinker_edge_restarts_animation() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        let car = |left: bool| {
            Message::CarState(CarState {
                left_blinker: left,
                ..Default::default()
            })
        };

        step(&mut agg, &mut sm, vec![car(true)]);
        assert_eq!(agg.scene().blinker.rate(), 115);
        step(&mut agg, &mut sm, vec![]);
        assert_eq!(agg.scene().blinker.rate(), 110);

        // Same state again is not an edge
        step(&mut agg, &mut sm, vec![car(true)]);
        assert_eq!(agg.scene().blinker.rate(), 105);

        step(&mut agg, &mut sm, vec![car(false)]);
        assert_eq!(agg.scene().blinker.rate(), 120);
    }

    #[test]
    fn test_gnss_keeps_count_without_report() {
        let mut agg = aggregator();
        let mut sm = SubMaster::new();
        let report = Message::UbloxGnss(UbloxGnss {
            measurement_report: Some(MeasurementReport { num_meas: 11 }),
        });
        step(&mut agg, &mut sm, vec![report]);
        step(&mut agg, &mut sm, vec![Message::UbloxGnss(UbloxGnss::default())]);
        assert_eq!(agg.scene().satellite_count, 11);
    }

    #[test]
    fn test_select_camera_keeps_framebuffer() {
        let mut agg = aggregator();
        agg.resize(1280, 720);
        agg.select_camera(CameraVariant::Wide);

        assert_eq!(agg.projector().variant(), CameraVariant::Wide);
        assert_eq!(agg.projector().framebuffer_size(), (1280, 720));
    }
}
