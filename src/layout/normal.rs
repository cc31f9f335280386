use image::RgbaImage;

use super::{disperse_all, never, quantize, CompiledPalette, PaletteLayout};
use crate::dither::Dithering;
use crate::histogram::ColorHistogram;
use crate::palette::{Palette, PALETTE_SIZE};

/// All 256 slots hold image colors.
#[derive(Debug, Default, Clone, Copy)]
pub struct Normal;

impl PaletteLayout for Normal {
    fn color_budget(&self) -> Option<usize> {
        Some(PALETTE_SIZE)
    }

    fn compile(&self, images: &[RgbaImage], dithering: Dithering) -> CompiledPalette {
        let histogram = ColorHistogram::from_frames(images, never);
        let mut quantized = quantize(&histogram, PALETTE_SIZE);
        let indices = disperse_all(
            images,
            &quantized.colors,
            &quantized.colors,
            &mut quantized.index_map,
            never,
            dithering,
        );
        CompiledPalette {
            palette: Palette::from_colors(quantized.colors),
            indices,
        }
    }
}
