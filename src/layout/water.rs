use image::{Pixel, Rgb, Rgba, RgbaImage};
use log::debug;

use super::{disperse_all, never, quantize, CompiledPalette, PaletteLayout};
use crate::dither::Dithering;
use crate::histogram::ColorHistogram;
use crate::palette::Palette;
use crate::settings::TextureSettings;

/// Slot holding the fog color.
pub const FOG_COLOR_SLOT: u8 = 3;
/// Slot whose red channel holds the fog intensity.
pub const FOG_INTENSITY_SLOT: u8 = 4;

const WATER_BUDGET: usize = 254;

/// Fog intensity for a fog color: darker fog is denser.
pub fn fog_intensity(color: Rgb<u8>) -> u8 {
    let [r, g, b] = color.0.map(u32::from);
    let luma = (21 * r + 72 * g + 7 * b) / 100;
    (255 - luma.min(255)) as u8
}

/// Slots 3 and 4 carry the underwater fog, everything else holds image colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Water {
    fog_color: Option<Rgba<u8>>,
}

impl Water {
    /// Uses `fog_color` with its alpha as intensity, or derives the fog from the images.
    pub fn new(fog_color: Option<Rgba<u8>>) -> Self {
        Self { fog_color }
    }

    /// Reads the fog color.
    pub fn from_settings(settings: &TextureSettings) -> Self {
        Self::new(settings.water_fog_color)
    }

    fn fog(&self, histogram: &ColorHistogram) -> (Rgb<u8>, u8) {
        match self.fog_color {
            Some(color) => (color.to_rgb(), color[3]),
            None => {
                let color = histogram
                    .average()
                    .map(|average| average.to_rgb())
                    .unwrap_or(Rgb([0, 0, 0]));
                (color, fog_intensity(color))
            }
        }
    }
}

/// Moves quantizer slots past the two fog slots.
fn to_palette_slot(index: u8) -> u8 {
    if index >= FOG_COLOR_SLOT {
        index + 2
    } else {
        index
    }
}

impl PaletteLayout for Water {
    fn color_budget(&self) -> Option<usize> {
        Some(WATER_BUDGET)
    }

    fn compile(&self, images: &[RgbaImage], dithering: Dithering) -> CompiledPalette {
        let histogram = ColorHistogram::from_frames(images, never);
        let mut quantized = quantize(&histogram, WATER_BUDGET);
        let (fog_color, intensity) = self.fog(&histogram);
        debug!("water fog {:?}, intensity {}", fog_color, intensity);

        let split = usize::from(FOG_COLOR_SLOT);
        let palette = Palette::from_colors(
            quantized.colors[..split]
                .iter()
                .copied()
                .chain(vec![fog_color, Rgb([intensity, 0, 0])])
                .chain(quantized.colors[split..].iter().copied()),
        );

        let mut indices = disperse_all(
            images,
            &quantized.colors,
            &quantized.colors,
            &mut quantized.index_map,
            never,
            dithering,
        );
        for index in indices.iter_mut().flatten() {
            *index = to_palette_slot(*index);
        }
        CompiledPalette { palette, indices }
    }
}
