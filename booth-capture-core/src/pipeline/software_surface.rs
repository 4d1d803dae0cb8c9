use std::sync::Arc;

use image::RgbaImage;
use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::processing::render::{render_direct, RenderTransform};
use crate::traits::render_surface::RenderSurface;

/// Surface that keeps the most recently presented preview in memory.
///
/// There is no GPU path; both present calls end up with a CPU-rendered image
/// at the surface size. Hosts read the image back through a
/// [`PreviewHandle`].
pub struct SoftwareSurface {
    size: (u32, u32),
    latest: Arc<Mutex<PresentedFrame>>,
}

#[derive(Default)]
struct PresentedFrame {
    image: Option<RgbaImage>,
    count: u64,
}

/// Read side of a `SoftwareSurface`, usable after the surface moved onto
/// the render thread.
#[derive(Clone)]
pub struct PreviewHandle {
    latest: Arc<Mutex<PresentedFrame>>,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> (Self, PreviewHandle) {
        let latest = Arc::new(Mutex::new(PresentedFrame::default()));
        (
            Self {
                size: (width, height),
                latest: Arc::clone(&latest),
            },
            PreviewHandle { latest },
        )
    }

    fn store(&self, image: RgbaImage) {
        let mut latest = self.latest.lock();
        latest.image = Some(image);
        latest.count += 1;
    }
}

impl RenderSurface for SoftwareSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn present_accelerated(
        &mut self,
        frame: &RgbaImage,
        transform: &RenderTransform,
    ) -> Result<(), CaptureError> {
        self.store(render_direct(frame, transform));
        Ok(())
    }

    fn present_direct(&mut self, frame: RgbaImage) {
        self.store(frame);
    }
}

impl PreviewHandle {
    /// Copy of the last presented preview, if anything was drawn yet.
    pub fn latest(&self) -> Option<RgbaImage> {
        self.latest.lock().image.clone()
    }

    pub fn presented(&self) -> u64 {
        self.latest.lock().count
    }
}
