//! Video stream client

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::frame::VideoFrame;
use crate::{VisionError, VisionStream};

/// Receives frames from one road camera stream at a time
pub trait VisionClient {
    /// Attach to a stream, replacing any current one
    fn connect(&mut self, stream: VisionStream) -> Result<(), VisionError>;

    fn disconnect(&mut self);

    /// Stream currently attached, if any
    fn connected(&self) -> Option<VisionStream>;

    /// Wait up to `timeout` for the next frame. `Ok(None)` on timeout.
    fn recv(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<VideoFrame>, VisionError>> + Send;
}

/// Client fed by in-process publishers over tokio channels
#[derive(Debug, Default)]
pub struct ChannelVisionClient {
    streams: HashMap<VisionStream, mpsc::Receiver<VideoFrame>>,
    current: Option<VisionStream>,
}

impl ChannelVisionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream and get the sender its publisher should use
    pub fn publish(&mut self, stream: VisionStream, capacity: usize) -> mpsc::Sender<VideoFrame> {
        let (tx, rx) = mpsc::channel(capacity);
        self.streams.insert(stream, rx);
        debug!("Registered {:?} stream", stream);
        tx
    }
}

impl VisionClient for ChannelVisionClient {
    fn connect(&mut self, stream: VisionStream) -> Result<(), VisionError> {
        if !self.streams.contains_key(&stream) {
            return Err(VisionError::Unavailable(stream));
        }
        self.current = Some(stream);
        info!("Connected to {:?} stream", stream);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.current.take() {
            info!("Disconnected from {:?} stream", stream);
        }
    }

    fn connected(&self) -> Option<VisionStream> {
        self.current
    }

    fn recv(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<VideoFrame>, VisionError>> + Send {
        async move {
            let stream = self.current.ok_or(VisionError::NotConnected)?;
            let rx = self
                .streams
                .get_mut(&stream)
                .ok_or(VisionError::Unavailable(stream))?;

            let received = tokio::time::timeout(timeout, rx.recv()).await;
            match received {
                Ok(Some(mut frame)) => {
                    // Skip to the newest queued frame
                    while let Ok(newer) = rx.try_recv() {
                        frame = newer;
                    }
                    Ok(Some(frame))
                }
                Ok(None) => {
                    self.streams.remove(&stream);
                    self.current = None;
                    Err(VisionError::Closed(stream))
                }
                Err(_) => Ok(None),
            }
        }
    }
}
