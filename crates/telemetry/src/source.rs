//! Telemetry sources

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::TelemetryError;
use crate::messages::Message;

/// Anything that can hand over the messages queued since the last call
pub trait TelemetrySource {
    /// Take all queued messages without blocking
    fn drain(&mut self) -> Vec<Message>;
}

/// Source fed by publishers over a tokio channel
pub struct ChannelSource {
    receiver: mpsc::Receiver<Message>,
    closed: bool,
}

impl ChannelSource {
    /// Create a source and the sender publishers should use
    pub fn channel(capacity: usize) -> (mpsc::Sender<Message>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            tx,
            Self {
                receiver: rx,
                closed: false,
            },
        )
    }

    /// Whether every publisher has dropped its sender
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl TelemetrySource for ChannelSource {
    fn drain(&mut self) -> Vec<Message> {
        let mut batch = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(msg) => batch.push(msg),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    if !self.closed {
                        debug!("All telemetry publishers dropped");
                        self.closed = true;
                    }
                    break;
                }
            }
        }
        batch
    }
}

/// Decode one newline-delimited JSON message
pub fn decode_line(line: &str) -> Result<Message, TelemetryError> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Publish every newline-delimited JSON message read from `reader`.
///
/// Blank lines are ignored and undecodable lines are logged and skipped.
/// Returns the number of messages published once the reader is exhausted.
pub async fn forward_ndjson<R>(reader: R, tx: mpsc::Sender<Message>) -> Result<u64, TelemetryError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut published = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match decode_line(&line) {
            Ok(msg) => {
                tx.send(msg).await.map_err(|_| TelemetryError::Disconnected)?;
                published += 1;
            }
            Err(e) => warn!("Skipping telemetry line: {}", e),
        }
    }

    debug!("Telemetry input exhausted after {} messages", published);
    Ok(published)
}
