use image::{Pixel, Rgb, Rgba, RgbaImage};

use super::{disperse_all, quantize, CompiledPalette, PaletteLayout};
use crate::dither::Dithering;
use crate::histogram::ColorHistogram;
use crate::palette::{Palette, LAST_SLOT};
use crate::settings::TextureSettings;

/// Color written to the color key slot.
pub const COLOR_KEY: Rgb<u8> = Rgb([0, 0, 255]);

/// The last slot is a color key for transparent pixels.
#[derive(Debug, Clone, Copy)]
pub struct Transparent {
    threshold: u8,
    key_color: Option<Rgb<u8>>,
}

impl Transparent {
    /// Transparent below `threshold` alpha or when matching `key_color`.
    pub fn new(threshold: u8, key_color: Option<Rgb<u8>>) -> Self {
        Self {
            threshold,
            key_color,
        }
    }

    /// Reads the transparency threshold and color.
    pub fn from_settings(settings: &TextureSettings) -> Self {
        Self::new(
            settings.transparency_threshold(),
            settings.transparency_color,
        )
    }

    /// Whether `color` maps onto the color key
    pub fn is_transparent(&self, color: &Rgba<u8>) -> bool {
        color[3] < self.threshold || self.key_color == Some(color.to_rgb())
    }
}

impl PaletteLayout for Transparent {
    fn color_budget(&self) -> Option<usize> {
        Some(usize::from(LAST_SLOT))
    }

    fn compile(&self, images: &[RgbaImage], dithering: Dithering) -> CompiledPalette {
        let is_transparent = |color: &Rgba<u8>| self.is_transparent(color);
        let histogram = ColorHistogram::from_frames(images, is_transparent);
        let mut quantized = quantize(&histogram, usize::from(LAST_SLOT));

        let mut palette = Palette::from_colors(quantized.colors.iter().copied());
        palette.set(LAST_SLOT, COLOR_KEY);
        let indices = disperse_all(
            images,
            &quantized.colors,
            palette.colors(),
            &mut quantized.index_map,
            is_transparent,
            dithering,
        );
        CompiledPalette { palette, indices }
    }
}
