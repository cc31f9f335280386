use image::{Pixel, Rgb, RgbaImage};

use super::decal::ramp_indices;
use super::{CompiledPalette, PaletteLayout};
use crate::dither::Dithering;
use crate::histogram::ColorHistogram;
use crate::palette::ramp_palette;
use crate::settings::{DecalTransparencySource, TextureSettings};

/// Decal-style ramp palette for sprites: one flat color, opacity per pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexAlpha {
    color: Option<Rgb<u8>>,
    source: DecalTransparencySource,
}

impl IndexAlpha {
    /// `color` overrides the color taken from the fully transparent pixels.
    pub fn new(color: Option<Rgb<u8>>, source: DecalTransparencySource) -> Self {
        Self { color, source }
    }

    /// Reads the decal color and transparency source.
    pub fn from_settings(settings: &TextureSettings) -> Self {
        Self::new(settings.decal_color, settings.decal_transparency_source())
    }

    fn flat_color(&self, images: &[RgbaImage]) -> Rgb<u8> {
        if let Some(color) = self.color {
            return color;
        }
        let hidden = ColorHistogram::from_frames(images, |c| c[3] != 0);
        let histogram = if hidden.is_empty() {
            ColorHistogram::from_frames(images, |_| false)
        } else {
            hidden
        };
        histogram
            .average()
            .map(|average| average.to_rgb())
            .unwrap_or(Rgb([0, 0, 0]))
    }
}

impl PaletteLayout for IndexAlpha {
    fn color_budget(&self) -> Option<usize> {
        None
    }

    fn compile(&self, images: &[RgbaImage], _: Dithering) -> CompiledPalette {
        CompiledPalette {
            palette: ramp_palette(self.flat_color(images)),
            indices: ramp_indices(images, self.source),
        }
    }
}
