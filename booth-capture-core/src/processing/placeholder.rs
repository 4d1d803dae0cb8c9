//! Synthetic imagery for running without camera hardware.
//!
//! Stills are a solid panel with a timestamp caption; live frames are a
//! scrolling gradient test pattern.

use std::io::Cursor;

use chrono::{DateTime, TimeZone};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::models::error::CaptureError;

const PANEL_COLORS: [[u8; 3]; 6] = [
    [233, 84, 107],
    [246, 174, 45],
    [75, 170, 145],
    [66, 134, 244],
    [155, 93, 229],
    [242, 100, 25],
];

const CAPTION_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

/// Caption text for a placeholder taken at `at`.
pub fn caption_for<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Solid color panel with `caption` drawn along the bottom.
///
/// The color is picked from a fixed palette by `seed`, so the same seed and
/// caption always produce the same pixels.
pub fn placeholder_panel(width: u32, height: u32, seed: u64, caption: &str) -> RgbaImage {
    let [r, g, b] = PANEL_COLORS[(seed % PANEL_COLORS.len() as u64) as usize];
    let mut image = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));

    let chars = caption.chars().count() as u32;
    if chars == 0 || width == 0 || height == 0 {
        return image;
    }

    // Each glyph cell is GLYPH_W + 1 columns wide (one column of spacing).
    let cell_w = GLYPH_W + 1;
    let scale = ((width * 3 / 4) / (chars * cell_w)).min(height / (GLYPH_H * 4)).max(1);
    let text_w = chars * cell_w * scale;
    let text_h = GLYPH_H * scale;

    // Darkened band behind the caption.
    let band_top = height.saturating_sub(text_h * 3);
    for y in band_top..height {
        for x in 0..width {
            let px = image.get_pixel_mut(x, y);
            px[0] /= 2;
            px[1] /= 2;
            px[2] /= 2;
        }
    }

    let origin_x = width.saturating_sub(text_w) / 2;
    let origin_y = band_top + text_h;
    for (i, ch) in caption.chars().enumerate() {
        let glyph_x = origin_x + i as u32 * cell_w * scale;
        draw_glyph(&mut image, ch, glyph_x, origin_y, scale);
    }

    image
}

/// Horizontal gradient that scrolls with `sequence`.
pub fn test_pattern(width: u32, height: u32, sequence: u64) -> RgbaImage {
    let shift = (sequence * 4 % 256) as u32;
    RgbaImage::from_fn(width, height, |x, y| {
        let r = ((x * 255 / width.max(1) + shift) % 256) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgba([r, g, 160, 255])
    })
}

/// Encode `image` as PNG bytes, the way a still output hands data back.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| CaptureError::CaptureFailed(format!("failed to encode still: {}", e)))?;
    Ok(bytes)
}

fn draw_glyph(image: &mut RgbaImage, ch: char, x0: u32, y0: u32, scale: u32) {
    let rows = glyph(ch);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_W {
            if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let x = x0 + col * scale + dx;
                    let y = y0 + row as u32 * scale + dy;
                    if x < image.width() && y < image.height() {
                        image.put_pixel(x, y, CAPTION_COLOR);
                    }
                }
            }
        }
    }
}

/// 3x5 bitmap rows, most significant bit on the left.
fn glyph(ch: char) -> [u8; 5] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        _ => [0; 5],
    }
}
