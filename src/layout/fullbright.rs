use image::RgbaImage;
use itertools::izip;

use super::{never, quantize, CompiledPalette, PaletteLayout};
use crate::dither::{self, Dithering, FloydSteinberg};
use crate::histogram::ColorHistogram;
use crate::indexer::NearestColorIndexer;
use crate::palette::{Palette, QuantizedColors, PALETTE_SIZE};
use crate::settings::DitheringAlgorithm;

const FULLBRIGHT_SLOTS: usize = 32;
const NORMAL_SLOTS: usize = PALETTE_SIZE - FULLBRIGHT_SLOTS;

/// The last 32 slots hold colors that ignore lighting.
///
/// A mask image per input image selects the fullbright pixels. Both palette
/// sections are quantized independently.
#[derive(Debug, Clone, Default)]
pub struct Fullbright {
    masks: Vec<RgbaImage>,
    threshold: u8,
}

impl Fullbright {
    /// Mask pixels with an alpha of at least `threshold` are fullbright.
    pub fn new(masks: Vec<RgbaImage>, threshold: u8) -> Self {
        Self { masks, threshold }
    }

    /// One flag per pixel of `images[image]`. Pixels outside the mask are not fullbright.
    fn mask_of(&self, image: usize, frame: &RgbaImage) -> Vec<bool> {
        let mask = self.masks.get(image);
        frame
            .enumerate_pixels()
            .map(|(x, y, _)| {
                mask.and_then(|mask| mask.get_pixel_checked(x, y))
                    .map_or(false, |pixel| pixel[3] >= self.threshold)
            })
            .collect()
    }

    fn histogram(images: &[RgbaImage], masks: &[Vec<bool>], fullbright: bool) -> ColorHistogram {
        ColorHistogram::from_pixels(images.iter().zip(masks).flat_map(|(image, mask)| {
            image
                .pixels()
                .zip(mask)
                .filter(move |&(_, &masked)| masked == fullbright)
                .map(|(pixel, _)| *pixel)
        }))
    }
}

impl PaletteLayout for Fullbright {
    fn color_budget(&self) -> Option<usize> {
        Some(NORMAL_SLOTS + FULLBRIGHT_SLOTS)
    }

    fn compile(&self, images: &[RgbaImage], dithering: Dithering) -> CompiledPalette {
        let masks: Vec<_> = images
            .iter()
            .enumerate()
            .map(|(i, image)| self.mask_of(i, image))
            .collect();

        let mut normal = quantize(&Self::histogram(images, &masks, false), NORMAL_SLOTS);
        let mut fullbright = quantize(&Self::histogram(images, &masks, true), FULLBRIGHT_SLOTS);
        let palette = Palette::from_colors(
            normal
                .colors
                .iter()
                .chain(fullbright.colors.iter())
                .copied(),
        );

        let normal_indices = disperse_section(images, &masks, false, &mut normal, dithering);
        let fullbright_indices =
            disperse_section(images, &masks, true, &mut fullbright, dithering);

        let indices = izip!(&masks, normal_indices, fullbright_indices)
            .map(|(mask, normal, fullbright)| {
                izip!(mask, normal, fullbright)
                    .map(|(&masked, normal, fullbright)| {
                        if masked {
                            NORMAL_SLOTS as u8 + fullbright
                        } else {
                            normal
                        }
                    })
                    .collect()
            })
            .collect();
        CompiledPalette { palette, indices }
    }
}

/// Maps the images onto one palette section.
///
/// Pixels of the other section pass no error on, their indices are discarded.
fn disperse_section(
    images: &[RgbaImage],
    masks: &[Vec<bool>],
    fullbright: bool,
    section: &mut QuantizedColors,
    dithering: Dithering,
) -> Vec<Vec<u8>> {
    let colors = &section.colors;
    let mut indexer = NearestColorIndexer::new(colors, &mut section.index_map, never);
    let mut floyd_steinberg = FloydSteinberg::default();
    images
        .iter()
        .zip(masks)
        .map(|(image, mask)| match dithering.algorithm {
            DitheringAlgorithm::None => dither::none(image, |c| indexer.index_of(c)),
            DitheringAlgorithm::FloydSteinberg => {
                let width = image.width() as usize;
                floyd_steinberg.disperse_where(
                    image,
                    colors,
                    |c| indexer.index_of(c),
                    dithering.scale,
                    |x, y, _| mask[y as usize * width + x as usize] != fullbright,
                )
            }
        })
        .collect()
}

/// Fully opaque mask pixels where `select` holds, transparent elsewhere.
#[cfg(test)]
pub(crate) fn mask_where(width: u32, height: u32, select: impl Fn(u32, u32) -> bool) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([255, 255, 255, if select(x, y) { 255 } else { 0 }])
    })
}
