//! Latest-value subscription store

use std::time::{Duration, Instant};

use tracing::trace;

use crate::messages::*;
use crate::source::TelemetrySource;

/// Latest value of one topic and when it arrived
#[derive(Debug, Clone, Default)]
pub struct Slot<T> {
    value: T,
    updated: bool,
    rcv_frame: u64,
    rcv_time: Option<Instant>,
}

impl<T> Slot<T> {
    /// Latest value, or the default before anything arrived
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Whether a new message arrived during the last update
    pub fn updated(&self) -> bool {
        self.updated
    }

    /// Latest value, only if it arrived during the last update
    pub fn fresh(&self) -> Option<&T> {
        self.updated.then_some(&self.value)
    }

    /// Whether any message was ever received
    pub fn received(&self) -> bool {
        self.rcv_time.is_some()
    }

    /// Frame count at which the latest message arrived (0 = never)
    pub fn rcv_frame(&self) -> u64 {
        self.rcv_frame
    }

    pub fn rcv_time(&self) -> Option<Instant> {
        self.rcv_time
    }

    /// Time since the latest message, `None` if nothing arrived yet
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.rcv_time.map(|t| now.saturating_duration_since(t))
    }

    fn set(&mut self, value: T, frame: u64, now: Instant) {
        self.value = value;
        self.updated = true;
        self.rcv_frame = frame;
        self.rcv_time = Some(now);
    }
}

/// Subscription store keeping the latest message of every topic.
///
/// Each [`update`](SubMaster::update) advances the frame counter, clears all
/// `updated` flags and applies the batch. Topics absent from the batch keep
/// their previous value.
#[derive(Debug, Clone, Default)]
pub struct SubMaster {
    frame: u64,
    pub controls_state: Slot<ControlsState>,
    pub car_state: Slot<CarState>,
    pub live_parameters: Slot<LiveParameters>,
    pub radar_state: Slot<RadarState>,
    pub live_calibration: Slot<LiveCalibration>,
    pub model: Slot<ModelV2>,
    pub device_state: Slot<DeviceState>,
    pub panda_state: Slot<PandaState>,
    pub ublox_gnss: Slot<UbloxGnss>,
    pub gps_location: Slot<GpsLocation>,
    pub lateral_plan: Slot<LateralPlan>,
    pub live_map_data: Slot<LiveMapData>,
    pub sensor_events: Slot<Vec<SensorEvent>>,
    pub road_camera_state: Slot<RoadCameraState>,
    pub car_params: Slot<CarParams>,
    pub driver_monitoring_state: Slot<DriverMonitoringState>,
}

impl SubMaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of updates performed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Drain a source and apply everything it had queued
    pub fn poll<S: TelemetrySource>(&mut self, source: &mut S, now: Instant) {
        let batch = source.drain();
        self.update(batch, now);
    }

    /// Apply one batch of messages. Later messages on the same topic win.
    pub fn update<I>(&mut self, messages: I, now: Instant)
    where
        I: IntoIterator<Item = Message>,
    {
        self.frame += 1;
        self.clear_updated();

        let frame = self.frame;
        for msg in messages {
            trace!("frame {}: {}", frame, msg.topic());
            match msg {
                Message::ControlsState(m) => self.controls_state.set(m, frame, now),
                Message::CarState(m) => self.car_state.set(m, frame, now),
                Message::LiveParameters(m) => self.live_parameters.set(m, frame, now),
                Message::RadarState(m) => self.radar_state.set(m, frame, now),
                Message::LiveCalibration(m) => self.live_calibration.set(m, frame, now),
                Message::ModelV2(m) => self.model.set(m, frame, now),
                Message::DeviceState(m) => self.device_state.set(m, frame, now),
                Message::PandaState(m) => self.panda_state.set(m, frame, now),
                Message::UbloxGnss(m) => self.ublox_gnss.set(m, frame, now),
                Message::GpsLocationExternal(m) => self.gps_location.set(m, frame, now),
                Message::LateralPlan(m) => self.lateral_plan.set(m, frame, now),
                Message::LiveMapData(m) => self.live_map_data.set(m, frame, now),
                Message::SensorEvents(m) => self.sensor_events.set(m, frame, now),
                Message::RoadCameraState(m) => self.road_camera_state.set(m, frame, now),
                Message::CarParams(m) => self.car_params.set(m, frame, now),
                Message::DriverMonitoringState(m) => {
                    self.driver_monitoring_state.set(m, frame, now)
                }
            }
        }
    }

    /// Whether the given topic arrived during the last update
    pub fn updated(&self, topic: Topic) -> bool {
        match topic {
            Topic::ControlsState => self.controls_state.updated,
            Topic::CarState => self.car_state.updated,
            Topic::LiveParameters => self.live_parameters.updated,
            Topic::RadarState => self.radar_state.updated,
            Topic::LiveCalibration => self.live_calibration.updated,
            Topic::ModelV2 => self.model.updated,
            Topic::DeviceState => self.device_state.updated,
            Topic::PandaState => self.panda_state.updated,
            Topic::UbloxGnss => self.ublox_gnss.updated,
            Topic::GpsLocationExternal => self.gps_location.updated,
            Topic::LateralPlan => self.lateral_plan.updated,
            Topic::LiveMapData => self.live_map_data.updated,
            Topic::SensorEvents => self.sensor_events.updated,
            Topic::RoadCameraState => self.road_camera_state.updated,
            Topic::CarParams => self.car_params.updated,
            Topic::DriverMonitoringState => self.driver_monitoring_state.updated,
        }
    }

    fn clear_updated(&mut self) {
        self.controls_state.updated = false;
        self.car_state.updated = false;
        self.live_parameters.updated = false;
        self.radar_state.updated = false;
        self.live_calibration.updated = false;
        self.model.updated = false;
        self.device_state.updated = false;
        self.panda_state.updated = false;
        self.ublox_gnss.updated = false;
        self.gps_location.updated = false;
        self.lateral_plan.updated = false;
        self.live_map_data.updated = false;
        self.sensor_events.updated = false;
        self.road_camera_state.updated = false;
        self.car_params.updated = false;
        self.driver_monitoring_state.updated = false;
    }
}
