//! Road Camera Video
//!
//! Frames from the road-facing cameras and a client that receives them:
//! - Narrow road stream (every device with a camera)
//! - Wide road stream (dual camera devices)

pub mod client;
pub mod frame;

pub use client::{ChannelVisionClient, VisionClient};
pub use frame::{PixelFormat, VideoFrame};

use thiserror::Error;

/// Video stream error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VisionError {
    #[error("Stream not available: {0:?}")]
    Unavailable(VisionStream),

    #[error("Not connected to a stream")]
    NotConnected,

    #[error("Stream closed by publisher: {0:?}")]
    Closed(VisionStream),
}

/// Road camera stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisionStream {
    /// Narrow field-of-view road camera
    Road,
    /// Wide field-of-view road camera
    Wide,
}
