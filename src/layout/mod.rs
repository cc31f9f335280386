//! Palette layouts of the different texture kinds.
//!
//! A layout decides how many slots the quantizer gets, which slots are
//! reserved and what they hold, and which pixels are transparent.

use image::{Rgb, Rgba, RgbaImage};

use crate::dither::{self, Dithering, FloydSteinberg};
use crate::error::BuildError;
use crate::histogram::ColorHistogram;
use crate::indexer::NearestColorIndexer;
use crate::palette::{ColorIndexMap, Palette, QuantizedColors, LAST_SLOT};
use crate::settings::{DitheringAlgorithm, TextureSettings};
use crate::texture::TextureKind;
use crate::{MedianCut, Quantizer};

mod decal;
mod fullbright;
mod index_alpha;
mod normal;
mod transparent;
mod water;

pub use decal::Decal;
pub use fullbright::Fullbright;
pub use index_alpha::IndexAlpha;
pub use normal::Normal;
pub use transparent::{Transparent, COLOR_KEY};
pub use water::{fog_intensity, Water, FOG_COLOR_SLOT, FOG_INTENSITY_SLOT};

/// Palette and one index buffer per input image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPalette {
    /// The 256 palette colors
    pub palette: Palette,
    /// Index buffers in input order
    pub indices: Vec<Vec<u8>>,
}

/// Palette layout of one texture kind
pub trait PaletteLayout {
    /// Slots handed to the quantizer, `None` for layouts with a fixed palette.
    fn color_budget(&self) -> Option<usize>;

    /// Builds one palette shared by all `images` and maps every image onto it.
    fn compile(&self, images: &[RgbaImage], dithering: Dithering) -> CompiledPalette;
}

/// Picks the layout for `kind`.
///
/// `fullbright_masks` holds one mask per image and is only read by fullbright layouts.
pub fn layout_for(
    kind: TextureKind,
    settings: &TextureSettings,
    fullbright_masks: Vec<RgbaImage>,
) -> Result<Box<dyn PaletteLayout>, BuildError> {
    let layout: Box<dyn PaletteLayout> = match kind {
        TextureKind::Normal => Box::new(Normal),
        TextureKind::Transparent => Box::new(Transparent::from_settings(settings)),
        TextureKind::Water => Box::new(Water::from_settings(settings)),
        TextureKind::Decal => Box::new(Decal::from_settings(settings)),
        TextureKind::Fullbright => Box::new(Fullbright::new(
            fullbright_masks,
            settings.fullbright_alpha_threshold(),
        )),
        TextureKind::IndexAlpha => Box::new(IndexAlpha::from_settings(settings)),
        TextureKind::Font => return Err(BuildError::UnsupportedKind(kind)),
    };
    Ok(layout)
}

fn never(_: &Rgba<u8>) -> bool {
    false
}

/// Median cut into `budget` slots, padded with zero colors.
fn quantize(histogram: &ColorHistogram, budget: usize) -> QuantizedColors {
    QuantizedColors::from_clusters(MedianCut.quantize(histogram, budget), budget)
}

/// Maps every image onto the palette.
///
/// `search` holds the slots lookups may pick, `palette` resolves every slot the
/// lookup returns, including 255 for transparent pixels. Transparency is judged
/// on the source pixels, so diffused error never turns an opaque pixel into a
/// transparent one.
fn disperse_all<F>(
    images: &[RgbaImage],
    search: &[Rgb<u8>],
    palette: &[Rgb<u8>],
    index_map: &mut ColorIndexMap,
    is_transparent: F,
    dithering: Dithering,
) -> Vec<Vec<u8>>
where
    F: Fn(&Rgba<u8>) -> bool,
{
    let mut indexer = NearestColorIndexer::new(search, index_map, &is_transparent);
    let mut floyd_steinberg = FloydSteinberg::default();
    images
        .iter()
        .map(|image| match dithering.algorithm {
            DitheringAlgorithm::None => dither::none(image, |c| indexer.index_of(c)),
            DitheringAlgorithm::FloydSteinberg => {
                let mut indices = floyd_steinberg.disperse(
                    image,
                    palette,
                    |c| indexer.nearest_of(c),
                    dithering.scale,
                    &is_transparent,
                );
                for (pixel, index) in image.pixels().zip(&mut indices) {
                    if is_transparent(pixel) {
                        *index = LAST_SLOT;
                    }
                }
                indices
            }
        })
        .collect()
}
