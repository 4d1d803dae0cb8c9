use image::imageops::{self, FilterType};
use image::RgbaImage;

/// How a filtered frame maps onto the preview surface.
///
/// Aspect-fill: the frame is scaled uniformly until it covers the whole
/// destination, then centered and cropped. Front-camera previews are
/// mirrored horizontally after cropping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    pub source: (u32, u32),
    pub target: (u32, u32),
    pub scale: f32,
    /// Size of the source after scaling, before cropping.
    pub scaled: (u32, u32),
    /// Top-left corner of the crop window inside the scaled image.
    pub crop_origin: (u32, u32),
    pub mirror: bool,
}

impl RenderTransform {
    pub fn aspect_fill(source: (u32, u32), target: (u32, u32), mirror: bool) -> Self {
        let (sw, sh) = (source.0.max(1), source.1.max(1));
        let (tw, th) = (target.0.max(1), target.1.max(1));

        let scale = (tw as f32 / sw as f32).max(th as f32 / sh as f32);
        let scaled_w = ((sw as f32 * scale).round() as u32).max(tw);
        let scaled_h = ((sh as f32 * scale).round() as u32).max(th);

        Self {
            source: (sw, sh),
            target: (tw, th),
            scale,
            scaled: (scaled_w, scaled_h),
            crop_origin: ((scaled_w - tw) / 2, (scaled_h - th) / 2),
            mirror,
        }
    }
}

/// CPU rendition of `transform`, used when the accelerated path fails.
pub fn render_direct(frame: &RgbaImage, transform: &RenderTransform) -> RgbaImage {
    let (scaled_w, scaled_h) = transform.scaled;
    let (tw, th) = transform.target;

    let scaled = if frame.dimensions() == (scaled_w, scaled_h) {
        frame.clone()
    } else {
        imageops::resize(frame, scaled_w, scaled_h, FilterType::Triangle)
    };

    let (cx, cy) = transform.crop_origin;
    let cropped = imageops::crop_imm(&scaled, cx, cy, tw, th).to_image();

    if transform.mirror {
        imageops::flip_horizontal(&cropped)
    } else {
        cropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgba;

    #[test]
    fn wide_source_crops_sides() {
        let t = RenderTransform::aspect_fill((200, 100), (100, 100), false);
        assert_relative_eq!(t.scale, 1.0);
        assert_eq!(t.scaled, (200, 100));
        assert_eq!(t.crop_origin, (50, 0));
    }

    #[test]
    fn tall_source_crops_top_and_bottom() {
        let t = RenderTransform::aspect_fill((100, 400), (200, 200), false);
        assert_relative_eq!(t.scale, 2.0);
        assert_eq!(t.scaled, (200, 800));
        assert_eq!(t.crop_origin, (0, 300));
    }

    #[test]
    fn direct_render_matches_target_size() {
        let frame = RgbaImage::from_pixel(64, 48, Rgba([10, 20, 30, 255]));
        let t = RenderTransform::aspect_fill((64, 48), (30, 40), false);
        let out = render_direct(&frame, &t);
        assert_eq!(out.dimensions(), (30, 40));
        assert_eq!(*out.get_pixel(15, 20), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn mirror_flips_horizontally() {
        let mut frame = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        frame.put_pixel(0, 0, Rgba([255, 0, 0, 255]));

        let plain = render_direct(&frame, &RenderTransform::aspect_fill((4, 4), (4, 4), false));
        let mirrored = render_direct(&frame, &RenderTransform::aspect_fill((4, 4), (4, 4), true));

        assert_eq!(*plain.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*mirrored.get_pixel(3, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*mirrored.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }
}
