use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;

use super::camera_models::CameraPosition;

/// One frame from the live video output.
///
/// Pixel data is shared, so handing a frame across threads never copies it.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub sequence: u64,
    /// Presentation timestamp relative to the start of the stream.
    pub timestamp: Duration,
    /// Position of the camera that produced the frame.
    pub position: CameraPosition,
    pub image: Arc<RgbaImage>,
}

impl VideoFrame {
    pub fn new(sequence: u64, timestamp: Duration, position: CameraPosition, image: RgbaImage) -> Self {
        Self {
            sequence,
            timestamp,
            position,
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
