use image::{Pixel, Rgb, Rgba, RgbaImage};

use super::{CompiledPalette, PaletteLayout};
use crate::dither::Dithering;
use crate::histogram::ColorHistogram;
use crate::palette::ramp_palette;
use crate::settings::{DecalTransparencySource, TextureSettings};

/// Grayscale ramp in slots 0 to 254 and the decal color in slot 255.
///
/// Pixels store their opacity as index, nothing is quantized.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decal {
    color: Option<Rgb<u8>>,
    source: DecalTransparencySource,
}

impl Decal {
    /// `color` overrides the color taken from the visible pixels.
    pub fn new(color: Option<Rgb<u8>>, source: DecalTransparencySource) -> Self {
        Self { color, source }
    }

    /// Reads the decal color and transparency source.
    pub fn from_settings(settings: &TextureSettings) -> Self {
        Self::new(settings.decal_color, settings.decal_transparency_source())
    }
}

/// Index of one pixel of a ramp palette.
pub(super) fn ramp_index(pixel: &Rgba<u8>, source: DecalTransparencySource) -> u8 {
    match source {
        DecalTransparencySource::AlphaChannel => pixel[3],
        DecalTransparencySource::Grayscale => {
            let sum: u16 = pixel.0[..3].iter().map(|&c| u16::from(c)).sum();
            (sum / 3) as u8
        }
    }
}

pub(super) fn ramp_indices(images: &[RgbaImage], source: DecalTransparencySource) -> Vec<Vec<u8>> {
    images
        .iter()
        .map(|image| image.pixels().map(|p| ramp_index(p, source)).collect())
        .collect()
}

impl PaletteLayout for Decal {
    fn color_budget(&self) -> Option<usize> {
        None
    }

    fn compile(&self, images: &[RgbaImage], _: Dithering) -> CompiledPalette {
        let color = self.color.unwrap_or_else(|| {
            ColorHistogram::from_frames(images, |c| c[3] == 0)
                .average()
                .map(|average| average.to_rgb())
                .unwrap_or(Rgb([0, 0, 0]))
        });
        CompiledPalette {
            palette: ramp_palette(color),
            indices: ramp_indices(images, self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::DITHERED;

    fn decal_image() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| {
            if y < 8 {
                Rgba([255, 255, 255, 0])
            } else {
                Rgba([200, 100, 0, (x * 16) as u8])
            }
        })
    }

    #[test]
    fn ramp_and_derived_color() {
        let compiled = Decal::default().compile(&[decal_image()], DITHERED);
        for i in 0..255u8 {
            assert_eq!(compiled.palette[i], Rgb([i, i, i]));
        }
        assert_eq!(compiled.palette[255], Rgb([200, 100, 0]));
        let indices = &compiled.indices[0];
        assert!(indices[..128].iter().all(|&i| i == 0));
        assert_eq!(&indices[128..144], &(0..16).map(|x| x * 16).collect::<Vec<u8>>()[..]);
    }

    #[test]
    fn explicit_color() {
        let decal = Decal::new(Some(Rgb([1, 2, 3])), DecalTransparencySource::AlphaChannel);
        let compiled = decal.compile(&[decal_image()], DITHERED);
        assert_eq!(compiled.palette[255], Rgb([1, 2, 3]));
    }

    #[test]
    fn grayscale_source() {
        let decal = Decal::new(None, DecalTransparencySource::Grayscale);
        let compiled = decal.compile(&[decal_image()], DITHERED);
        assert!(compiled.indices[0][..128].iter().all(|&i| i == 255));
        assert!(compiled.indices[0][128..].iter().all(|&i| i == 100));
    }
}
