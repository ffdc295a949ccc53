//! UI loop
//!
//! One cycle: poll telemetry, rebuild the scene, derive status, pull video,
//! drive the display controllers and sounds, then draw.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alerting::{AudioSink, SoundSelector};
use display::{BrightnessController, BrightnessSettings, DisplayInputs, WakefulnessController};
use projection::CameraVariant;
use scene::SceneAggregator;
use status::{StatusController, Transition};
use telemetry::messages::AlertSize;
use telemetry::{ChannelSource, SubMaster, Topic, UI_FREQ};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use vision::{VideoFrame, VisionClient, VisionStream};

use crate::backlight::BacklightActuator;
use crate::render::RenderDriver;
use crate::settings::{AppConfig, SettingsStore};

/// Frames between settings reloads
pub const SETTINGS_RELOAD_FRAMES: u64 = 5 * UI_FREQ;

/// Cycle period while offroad
pub const OFFROAD_CYCLE: Duration = Duration::from_millis(1000 / UI_FREQ);

/// Capacity of the telemetry queue between the reader and the loop
pub const TELEMETRY_QUEUE: usize = 1024;

#[derive(Debug, Clone, Copy)]
enum BacklightCommand {
    Brightness(u8),
    Power(bool),
}

/// Ordered backlight writes, applied by one blocking worker so sysfs
/// latency never stalls the loop
struct BacklightQueue {
    actuator: Arc<dyn BacklightActuator>,
    tx: mpsc::UnboundedSender<BacklightCommand>,
    /// Taken when the worker starts
    rx: Option<mpsc::UnboundedReceiver<BacklightCommand>>,
}

impl BacklightQueue {
    fn new(actuator: Arc<dyn BacklightActuator>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            actuator,
            tx,
            rx: Some(rx),
        }
    }

    /// Queue a write. The worker is started on first use, inside the runtime,
    /// and stops once the queue is dropped.
    fn send(&mut self, command: BacklightCommand) {
        if let Some(mut rx) = self.rx.take() {
            let actuator = Arc::clone(&self.actuator);
            tokio::task::spawn_blocking(move || {
                while let Some(command) = rx.blocking_recv() {
                    apply_backlight(actuator.as_ref(), command);
                }
                debug!("Backlight worker stopped");
            });
        }
        if self.tx.send(command).is_err() {
            warn!("Backlight worker gone, dropping {:?}", command);
        }
    }
}

fn apply_backlight(actuator: &dyn BacklightActuator, command: BacklightCommand) {
    let result = match command {
        BacklightCommand::Brightness(level) => actuator.set_brightness(level),
        BacklightCommand::Power(on) => actuator.set_display_power(on),
    };
    if let Err(e) = result {
        warn!("Backlight write failed: {}", e);
    }
}

fn stream_for(camera: CameraVariant) -> VisionStream {
    match camera {
        CameraVariant::Narrow => VisionStream::Road,
        CameraVariant::Wide => VisionStream::Wide,
    }
}

/// Owns every piece of UI state and runs the per-cycle pipeline
pub struct UiDriver<R, V, S>
where
    R: RenderDriver,
    V: VisionClient,
    S: SettingsStore,
{
    sm: SubMaster,
    source: ChannelSource,
    aggregator: SceneAggregator,
    status: StatusController,
    brightness: BrightnessController,
    wake: WakefulnessController,
    sounds: SoundSelector<Box<dyn AudioSink + Send>>,
    renderer: R,
    vision: V,
    settings_store: S,
    backlight: BacklightQueue,
    stream: VisionStream,
    video_timeout: Duration,
    last_frame: Option<VideoFrame>,
}

impl<R, V, S> UiDriver<R, V, S>
where
    R: RenderDriver,
    V: VisionClient,
    S: SettingsStore,
{
    pub fn new(
        config: &AppConfig,
        source: ChannelSource,
        renderer: R,
        vision: V,
        settings_store: S,
        backlight: Arc<dyn BacklightActuator>,
        audio: Box<dyn AudioSink + Send>,
    ) -> Self {
        info!(
            "Creating UI driver for {:?} at {}x{}",
            config.hardware, config.framebuffer_width, config.framebuffer_height
        );

        let mut sounds = SoundSelector::new(config.sound.clone(), audio);
        sounds.set_volume_boost(config.settings.volume_boost);

        Self {
            sm: SubMaster::new(),
            source,
            aggregator: SceneAggregator::new(
                config.hardware,
                config.scene.clone(),
                config.settings.clone(),
                config.framebuffer_width,
                config.framebuffer_height,
            ),
            status: StatusController::new(),
            brightness: BrightnessController::new(),
            wake: WakefulnessController::new(),
            sounds,
            renderer,
            vision,
            settings_store,
            backlight: BacklightQueue::new(backlight),
            stream: VisionStream::Road,
            video_timeout: Duration::from_millis(config.video_timeout_ms),
            last_frame: None,
        }
    }

    pub fn aggregator(&self) -> &SceneAggregator {
        &self.aggregator
    }

    pub fn status(&self) -> &StatusController {
        &self.status
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn vision(&self) -> &V {
        &self.vision
    }

    pub fn frame(&self) -> u64 {
        self.sm.frame()
    }

    /// Whether every telemetry publisher has gone away
    pub fn telemetry_closed(&self) -> bool {
        self.source.is_closed()
    }

    /// Run one UI cycle
    pub async fn step(&mut self, now: Instant) {
        self.sm.poll(&mut self.source, now);

        if self.sm.frame() % SETTINGS_RELOAD_FRAMES == 0 {
            self.reload_settings();
        }
        if let Some((width, height)) = self.renderer.resized() {
            self.aggregator.resize(width, height);
        }

        self.aggregator.update(&self.sm);
        self.update_status();
        self.update_video().await;
        self.update_display();
        self.sounds.update(&self.sm, now);

        let view = self.aggregator.view(self.status.status());
        self.renderer.draw(&view, self.last_frame.as_ref());
        metrics::counter!("cluster_ui_frames_drawn_total").increment(1);
    }

    /// Run until `shutdown` resolves or telemetry ends
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            let onroad = self.status.is_onroad();
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = pace(onroad) => {}
            }

            self.step(Instant::now()).await;

            if self.source.is_closed() {
                info!("Telemetry ended after {} frames", self.sm.frame());
                break;
            }
        }
        self.vision.disconnect();
    }

    fn reload_settings(&mut self) {
        match self.settings_store.load() {
            Ok(settings) => {
                self.sounds.set_volume_boost(settings.volume_boost);
                self.aggregator.apply_settings(settings);
            }
            Err(e) => warn!("Keeping previous settings: {}", e),
        }
    }

    fn update_status(&mut self) {
        let transition = self.status.update(
            self.aggregator.scene(),
            self.sm.updated(Topic::ControlsState),
            self.sm.frame(),
            self.aggregator.hardware(),
            self.aggregator.settings().enable_wide_camera,
        );

        match transition {
            Some(Transition::Onroad { camera }) => {
                self.aggregator.select_camera(camera);
                self.stream = stream_for(camera);
                self.vision.disconnect();
            }
            Some(Transition::Offroad) => {
                self.vision.disconnect();
                self.last_frame = None;
            }
            None => {}
        }
    }

    async fn update_video(&mut self) {
        let started = self.aggregator.scene().started;
        if started && self.vision.connected().is_none() {
            if let Err(e) = self.vision.connect(self.stream) {
                trace!("Video not ready: {}", e);
            }
        }

        if self.vision.connected().is_none() {
            if started {
                // Onroad without video: keep the offroad cadence instead of spinning
                tokio::time::sleep(OFFROAD_CYCLE).await;
            }
            return;
        }

        match self.vision.recv(self.video_timeout).await {
            Ok(Some(frame)) if frame.is_complete() => self.last_frame = Some(frame),
            Ok(Some(frame)) => warn!("Dropping truncated frame {}", frame.sequence),
            Ok(None) => {
                metrics::counter!("cluster_ui_video_timeouts_total").increment(1);
                if self.aggregator.hardware().has_camera() {
                    warn!("Timed out waiting for video frame");
                }
            }
            Err(e) => {
                warn!("Video stream error: {}", e);
                self.last_frame = None;
            }
        }
    }

    fn update_display(&mut self) {
        let scene = self.aggregator.scene();
        let settings = self.aggregator.settings();
        let inputs = DisplayInputs {
            started: scene.started,
            ignition: scene.panda.ignition,
            light_sensor: scene.light_sensor,
            touched: self.renderer.take_touch(),
            alert_visible: scene.controls.alert_size != AlertSize::None,
            accel: scene.motion.accel,
            gyro: scene.motion.gyro,
        };
        let brightness_settings = BrightnessSettings {
            auto_screen_off: settings.auto_screen_off,
            manual: settings.brightness,
            brightness_off: settings.brightness_off,
        };

        if let Some(awake) = self.wake.update(&inputs) {
            self.dispatch(BacklightCommand::Power(awake));
        }
        if let Some(level) =
            self.brightness
                .update(&inputs, self.wake.is_awake(), &brightness_settings)
        {
            metrics::gauge!("cluster_ui_backlight_percent").set(f64::from(level));
            self.dispatch(BacklightCommand::Brightness(level));
        }
    }

    fn dispatch(&mut self, command: BacklightCommand) {
        debug!("Backlight command {:?}", command);
        self.backlight.send(command);
    }
}

async fn pace(onroad: bool) {
    if onroad {
        // Video receive paces onroad cycles
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(OFFROAD_CYCLE).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlight::BacklightError;
    use crate::settings::SettingsError;
    use alerting::LoggingSink;
    use projection::HardwareProfile;
    use scene::{SceneView, SystemStatus, UiSettings};
    use std::sync::Mutex;
    use telemetry::messages::{DeviceState, PandaState};
    use telemetry::Message;
    use tokio::sync::mpsc;
    use vision::{ChannelVisionClient, PixelFormat};

    #[derive(Debug, Default)]
    struct RecordingRenderer {
        draws: Vec<(SystemStatus, Option<u32>)>,
        pending_touch: bool,
    }

    impl RenderDriver for RecordingRenderer {
        fn draw(&mut self, view: &SceneView<'_>, frame: Option<&VideoFrame>) {
            self.draws.push((view.status(), frame.map(|f| f.sequence)));
        }

        fn take_touch(&mut self) -> bool {
            std::mem::take(&mut self.pending_touch)
        }
    }

    #[derive(Debug, Default)]
    struct RecordingBacklight {
        levels: Mutex<Vec<u8>>,
        power: Mutex<Vec<bool>>,
        first_write_delay: Duration,
    }

    impl BacklightActuator for RecordingBacklight {
        fn set_brightness(&self, percent: u8) -> Result<(), BacklightError> {
            if self.levels.lock().unwrap().is_empty() {
                std::thread::sleep(self.first_write_delay);
            }
            self.levels.lock().unwrap().push(percent);
            Ok(())
        }

        fn set_display_power(&self, on: bool) -> Result<(), BacklightError> {
            self.power.lock().unwrap().push(on);
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default)]
    struct SharedSettings(Arc<Mutex<UiSettings>>);

    impl SettingsStore for SharedSettings {
        fn load(&self) -> Result<UiSettings, SettingsError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    type TestDriver = UiDriver<RecordingRenderer, ChannelVisionClient, SharedSettings>;

    fn driver(
        config: &AppConfig,
        vision: ChannelVisionClient,
        settings: SharedSettings,
        backlight: Arc<RecordingBacklight>,
    ) -> (mpsc::Sender<Message>, TestDriver) {
        let (tx, source) = ChannelSource::channel(TELEMETRY_QUEUE);
        let driver = UiDriver::new(
            config,
            source,
            RecordingRenderer::default(),
            vision,
            settings,
            backlight,
            Box::new(LoggingSink),
        );
        (tx, driver)
    }

    fn start_messages() -> Vec<Message> {
        vec![
            Message::DeviceState(DeviceState {
                started: true,
                ..Default::default()
            }),
            Message::PandaState(PandaState {
                ignition_line: true,
                ..Default::default()
            }),
        ]
    }

    fn frame(sequence: u32) -> VideoFrame {
        VideoFrame::new(vec![0; 12], 4, 2, PixelFormat::Nv12, 0, sequence)
    }

    async fn wait_for<F: Fn() -> bool>(check: F) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !check() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_offroad_cycle_draws_and_sets_backlight() {
        let backlight = Arc::new(RecordingBacklight::default());
        let (_tx, mut ui) = driver(
            &AppConfig::default(),
            ChannelVisionClient::new(),
            SharedSettings::default(),
            Arc::clone(&backlight),
        );

        ui.step(Instant::now()).await;

        assert_eq!(ui.renderer().draws, vec![(SystemStatus::Disengaged, None)]);
        assert!(!ui.status().is_onroad());
        wait_for(|| !backlight.levels.lock().unwrap().is_empty()).await;
        assert_eq!(backlight.levels.lock().unwrap()[0], 75);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_backlight_writes_applied_in_order() {
        let backlight = Arc::new(RecordingBacklight {
            first_write_delay: Duration::from_millis(30),
            ..Default::default()
        });
        let (_tx, mut ui) = driver(
            &AppConfig::default(),
            ChannelVisionClient::new(),
            SharedSettings::default(),
            Arc::clone(&backlight),
        );

        ui.dispatch(BacklightCommand::Brightness(40));
        ui.dispatch(BacklightCommand::Power(false));
        ui.dispatch(BacklightCommand::Brightness(90));
        ui.dispatch(BacklightCommand::Power(true));

        wait_for(|| backlight.power.lock().unwrap().len() == 2).await;
        assert_eq!(*backlight.levels.lock().unwrap(), vec![40, 90]);
        assert_eq!(*backlight.power.lock().unwrap(), vec![false, true]);
    }

    #[tokio::test]
    async fn test_onroad_transition_connects_narrow_stream() {
        let mut vision = ChannelVisionClient::new();
        let road = vision.publish(VisionStream::Road, 4);
        road.send(frame(7)).await.unwrap();

        let (tx, mut ui) = driver(
            &AppConfig::default(),
            vision,
            SharedSettings::default(),
            Arc::new(RecordingBacklight::default()),
        );
        for msg in start_messages() {
            tx.send(msg).await.unwrap();
        }

        ui.step(Instant::now()).await;

        assert!(ui.status().is_onroad());
        assert_eq!(ui.vision().connected(), Some(VisionStream::Road));
        assert_eq!(ui.renderer().draws.last(), Some(&(SystemStatus::Disengaged, Some(7))));
    }

    #[tokio::test]
    async fn test_wide_camera_selected_on_dual_camera_device() {
        let config = AppConfig {
            hardware: HardwareProfile::Tici,
            settings: UiSettings {
                enable_wide_camera: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut vision = ChannelVisionClient::new();
        let _road = vision.publish(VisionStream::Road, 4);
        let wide = vision.publish(VisionStream::Wide, 4);
        wide.send(frame(3)).await.unwrap();

        let (tx, mut ui) = driver(
            &config,
            vision,
            SharedSettings(Arc::new(Mutex::new(config.settings.clone()))),
            Arc::new(RecordingBacklight::default()),
        );
        for msg in start_messages() {
            tx.send(msg).await.unwrap();
        }

        ui.step(Instant::now()).await;

        assert_eq!(ui.vision().connected(), Some(VisionStream::Wide));
        assert_eq!(ui.aggregator().projector().variant(), CameraVariant::Wide);
    }

    #[tokio::test]
    async fn test_offroad_transition_drops_video() {
        let mut vision = ChannelVisionClient::new();
        let road = vision.publish(VisionStream::Road, 4);
        road.send(frame(1)).await.unwrap();

        let (tx, mut ui) = driver(
            &AppConfig::default(),
            vision,
            SharedSettings::default(),
            Arc::new(RecordingBacklight::default()),
        );
        for msg in start_messages() {
            tx.send(msg).await.unwrap();
        }
        ui.step(Instant::now()).await;
        assert!(ui.status().is_onroad());

        tx.send(Message::DeviceState(DeviceState::default())).await.unwrap();
        ui.step(Instant::now()).await;

        assert!(!ui.status().is_onroad());
        assert_eq!(ui.vision().connected(), None);
        assert_eq!(ui.renderer().draws.last(), Some(&(SystemStatus::Disengaged, None)));
    }

    #[tokio::test]
    async fn test_settings_reloaded_periodically() {
        let shared = SharedSettings::default();
        let (_tx, mut ui) = driver(
            &AppConfig::default(),
            ChannelVisionClient::new(),
            shared.clone(),
            Arc::new(RecordingBacklight::default()),
        );

        shared.0.lock().unwrap().is_metric = false;
        for _ in 0..SETTINGS_RELOAD_FRAMES - 1 {
            ui.step(Instant::now()).await;
        }
        assert!(ui.aggregator().settings().is_metric);

        ui.step(Instant::now()).await;
        assert_eq!(ui.frame(), SETTINGS_RELOAD_FRAMES);
        assert!(!ui.aggregator().settings().is_metric);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_telemetry_ends() {
        let (tx, ui) = driver(
            &AppConfig::default(),
            ChannelVisionClient::new(),
            SharedSettings::default(),
            Arc::new(RecordingBacklight::default()),
        );
        drop(tx);

        tokio::time::timeout(Duration::from_secs(5), ui.run(std::future::pending()))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let (_tx, ui) = driver(
            &AppConfig::default(),
            ChannelVisionClient::new(),
            SharedSettings::default(),
            Arc::new(RecordingBacklight::default()),
        );

        let shutdown = tokio::time::sleep(Duration::from_millis(500));
        tokio::time::timeout(Duration::from_secs(5), ui.run(shutdown))
            .await
            .unwrap();
    }
}
