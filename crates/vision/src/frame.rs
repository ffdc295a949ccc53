//! Video frame types

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb24,
    Nv12,
}

impl PixelFormat {
    /// Buffer size for a frame of this format
    pub fn frame_len(self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            PixelFormat::Rgb24 => pixels * 3,
            // Full-res luma plane plus interleaved half-res chroma
            PixelFormat::Nv12 => pixels + pixels / 2,
        }
    }
}

/// One road camera frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Pixel data in `format` layout
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    pub format: PixelFormat,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        timestamp_ns: u64,
        sequence: u32,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            timestamp_ns,
            sequence,
        }
    }

    /// Whether the buffer holds a full frame
    pub fn is_complete(&self) -> bool {
        self.data.len() >= self.format.frame_len(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_len() {
        assert_eq!(PixelFormat::Rgb24.frame_len(4, 2), 24);
        assert_eq!(PixelFormat::Nv12.frame_len(4, 2), 12);
    }

    #[test]
    fn test_truncated_frame_incomplete() {
        let frame = VideoFrame::new(vec![0; 10], 4, 2, PixelFormat::Nv12, 0, 0);
        assert!(!frame.is_complete());

        let frame = VideoFrame::new(vec![0; 12], 4, 2, PixelFormat::Nv12, 0, 0);
        assert!(frame.is_complete());
    }

    #[test]
    fn test_large_dimensions_do_not_overflow() {
        let frame = VideoFrame::new(vec![0; 3], 70_000, 70_000, PixelFormat::Rgb24, 0, 0);
        assert!(!frame.is_complete());
        assert_eq!(
            PixelFormat::Rgb24.frame_len(70_000, 70_000),
            70_000usize * 70_000 * 3
        );
    }

}
