//! Telemetry Error Types

use thiserror::Error;

/// Errors while receiving or decoding telemetry
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Message could not be decoded
    #[error("Failed to decode telemetry message: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reading the input stream failed
    #[error("Telemetry read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Nobody is consuming the messages any more
    #[error("Telemetry consumer disconnected")]
    Disconnected,
}
