//! Live preview and capture filter catalog.
//!
//! Every filter is a pure same-extent transform: the output has the input's
//! dimensions and depends only on the input pixels and their coordinates.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Filters the user can pick while framing a shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// No filter applied
    #[default]
    None,
    /// Black & white
    Mono,
    /// Warm brownish tint
    Sepia,
    /// High contrast black & white
    Noir,
    /// Boosted saturation and contrast
    Vivid,
    /// Blue color temperature shift
    Cool,
    /// Orange/amber color temperature shift
    Warm,
    /// Lifted blacks with muted colors
    Fade,
    /// Two-color gradient mapping
    Duotone,
    /// Darkened edges
    Vignette,
    /// Inverted colors
    Negative,
    /// Reduced color levels
    Posterize,
    /// Partially inverted tones
    Solarize,
}

impl FilterKind {
    const ALL: [FilterKind; 13] = [
        Self::None,
        Self::Mono,
        Self::Sepia,
        Self::Noir,
        Self::Vivid,
        Self::Cool,
        Self::Warm,
        Self::Fade,
        Self::Duotone,
        Self::Vignette,
        Self::Negative,
        Self::Posterize,
        Self::Solarize,
    ];

    pub fn all() -> &'static [FilterKind] {
        &Self::ALL
    }

    /// The filter after this one in the catalog, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::None => "Original",
            Self::Mono => "Mono",
            Self::Sepia => "Sepia",
            Self::Noir => "Noir",
            Self::Vivid => "Vivid",
            Self::Cool => "Cool",
            Self::Warm => "Warm",
            Self::Fade => "Fade",
            Self::Duotone => "Duotone",
            Self::Vignette => "Vignette",
            Self::Negative => "Negative",
            Self::Posterize => "Posterize",
            Self::Solarize => "Solarize",
        }
    }
}

/// Apply `filter` to `image`, returning a new image of the same size.
pub fn apply_filter(image: &RgbaImage, filter: FilterKind) -> RgbaImage {
    if filter == FilterKind::None {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let mut output = RgbaImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let Rgba([r8, g8, b8, a]) = *pixel;
        let mut r = r8 as f32 / 255.0;
        let mut g = g8 as f32 / 255.0;
        let mut b = b8 as f32 / 255.0;

        apply_filter_rgb(&mut r, &mut g, &mut b, filter, x, y, width, height);

        output.put_pixel(x, y, Rgba([to_u8(r), to_u8(g), to_u8(b), a]));
    }

    output
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Apply filter effect to normalized RGB values in-place
#[inline]
#[allow(clippy::too_many_arguments)]
fn apply_filter_rgb(
    r: &mut f32,
    g: &mut f32,
    b: &mut f32,
    filter: FilterKind,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) {
    match filter {
        FilterKind::None => {}

        FilterKind::Mono => {
            let gray = luminance(*r, *g, *b);
            *r = gray;
            *g = gray;
            *b = gray;
        }

        FilterKind::Sepia => {
            let lum = luminance(*r, *g, *b);
            *r = (lum * 1.2 + 0.1).clamp(0.0, 1.0);
            *g = (lum * 0.9 + 0.05).clamp(0.0, 1.0);
            *b = (lum * 0.7).clamp(0.0, 1.0);
        }

        FilterKind::Noir => {
            let lum = luminance(*r, *g, *b);
            let adjusted = ((lum - 0.5) * 2.0 + 0.5).clamp(0.0, 1.0);
            *r = adjusted;
            *g = adjusted;
            *b = adjusted;
        }

        FilterKind::Vivid => {
            let lum = luminance(*r, *g, *b);
            for c in [&mut *r, &mut *g, &mut *b] {
                *c = (lum + (*c - lum) * 1.4).clamp(0.0, 1.0);
                *c = ((*c - 0.5) * 1.15 + 0.5).clamp(0.0, 1.0);
            }
        }

        FilterKind::Cool => {
            *r = (*r * 0.9).clamp(0.0, 1.0);
            *g = (*g * 0.95).clamp(0.0, 1.0);
            *b = (*b * 1.1).clamp(0.0, 1.0);
        }

        FilterKind::Warm => {
            *r = (*r * 1.1).clamp(0.0, 1.0);
            *b = (*b * 0.85).clamp(0.0, 1.0);
        }

        FilterKind::Fade => {
            for c in [&mut *r, &mut *g, &mut *b] {
                *c = (*c * 0.85 + 0.1).clamp(0.0, 1.0);
            }
            let lum = luminance(*r, *g, *b);
            for c in [&mut *r, &mut *g, &mut *b] {
                *c = (lum + (*c - lum) * 0.7).clamp(0.0, 1.0);
            }
        }

        FilterKind::Duotone => {
            let lum = luminance(*r, *g, *b);
            let dark = (0.1, 0.1, 0.4);
            let light = (1.0, 0.9, 0.5);
            *r = dark.0 + lum * (light.0 - dark.0);
            *g = dark.1 + lum * (light.1 - dark.1);
            *b = dark.2 + lum * (light.2 - dark.2);
        }

        FilterKind::Vignette => {
            let tex_x = (x as f32 + 0.5) / width as f32;
            let tex_y = (y as f32 + 0.5) / height as f32;
            let dx = tex_x - 0.5;
            let dy = tex_y - 0.5;
            let dist = (dx * dx + dy * dy).sqrt();
            let vignette = 1.0 - smoothstep(0.3, 0.9, dist);
            *r *= vignette;
            *g *= vignette;
            *b *= vignette;
        }

        FilterKind::Negative => {
            *r = 1.0 - *r;
            *g = 1.0 - *g;
            *b = 1.0 - *b;
        }

        FilterKind::Posterize => {
            let levels = 4.0;
            *r = (*r * levels).floor() / levels;
            *g = (*g * levels).floor() / levels;
            *b = (*b * levels).floor() / levels;
        }

        FilterKind::Solarize => {
            let threshold = 0.5;
            for c in [&mut *r, &mut *g, &mut *b] {
                if *c > threshold {
                    *c = 1.0 - *c;
                }
            }
        }
    }
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
