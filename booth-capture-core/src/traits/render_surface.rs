use image::RgbaImage;

use crate::models::error::CaptureError;
use crate::processing::render::RenderTransform;

/// Destination for the filtered live preview.
///
/// `present_accelerated` receives the unscaled filtered frame and the
/// transform to apply on the GPU. If it fails, the pipeline applies the
/// transform on the CPU and calls `present_direct` with a frame already at
/// the surface size.
pub trait RenderSurface: Send + 'static {
    /// Destination size in pixels.
    fn size(&self) -> (u32, u32);

    fn present_accelerated(
        &mut self,
        frame: &RgbaImage,
        transform: &RenderTransform,
    ) -> Result<(), CaptureError>;

    fn present_direct(&mut self, frame: RgbaImage);
}
