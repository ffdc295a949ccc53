//! Instrument Cluster UI - Main Entry Point
//!
//! Reads newline-delimited JSON telemetry on stdin and renders until the
//! input ends or Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use alerting::LoggingSink;
use cluster_ui::{
    init_logging, BacklightActuator, ConfigFileStore, NoopBacklight, SysfsBacklight,
    TraceRenderer, UiDriver, TELEMETRY_QUEUE,
};
use telemetry::{forward_ndjson, ChannelSource};
use tokio::io::BufReader;
use tracing::{error, info, warn};
use vision::ChannelVisionClient;

/// Config file used when neither an argument nor `CLUSTER_UI_CONFIG` names one
const DEFAULT_CONFIG: &str = "cluster_ui.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CLUSTER_UI_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let store = ConfigFileStore::new(Some(PathBuf::from(config_path)));
    let config = store.load_app_config()?;

    init_logging(&config.log_level, config.log_json)?;

    info!("=== Instrument Cluster UI v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Config: {:?}", store.path());

    let backlight: Arc<dyn BacklightActuator> = match &config.backlight_dir {
        Some(dir) => match SysfsBacklight::open(dir) {
            Ok(bl) => Arc::new(bl),
            Err(e) => {
                warn!("Backlight unavailable, continuing without: {}", e);
                Arc::new(NoopBacklight)
            }
        },
        None => Arc::new(NoopBacklight),
    };

    let (tx, source) = ChannelSource::channel(TELEMETRY_QUEUE);
    let reader = tokio::spawn(async move {
        match forward_ndjson(BufReader::new(tokio::io::stdin()), tx).await {
            Ok(count) => info!("Telemetry input ended after {} messages", count),
            Err(e) => error!("Telemetry input failed: {}", e),
        }
    });

    let driver = UiDriver::new(
        &config,
        source,
        TraceRenderer::new(),
        ChannelVisionClient::new(),
        store,
        backlight,
        Box::new(LoggingSink),
    );

    driver
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    reader.abort();
    info!("Shutdown complete");
    Ok(())
}
