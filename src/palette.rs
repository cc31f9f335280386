use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use image::{Pixel, Rgb, Rgba};
use itertools::Itertools;

use crate::Cluster;

/// Number of entries of every GoldSrc palette.
pub const PALETTE_SIZE: usize = 256;

/// Slot of the color key in transparent textures and of the decal color.
pub const LAST_SLOT: u8 = 255;

/// Memoized color to palette slot mapping.
///
/// Only valid for the palette it was built for.
pub type ColorIndexMap = HashMap<Rgba<u8>, u8>;

/// Palette of exactly 256 colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![Rgb([0, 0, 0]); PALETTE_SIZE],
        }
    }
}

impl Palette {
    /// Builds a palette from up to 256 colors, zero-filling the remaining slots.
    pub fn from_colors(colors: impl IntoIterator<Item = Rgb<u8>>) -> Self {
        let mut palette = Self::default();
        for (slot, color) in palette.colors.iter_mut().zip(colors) {
            *slot = color;
        }
        palette
    }

    /// The 256 colors
    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    /// Overwrites one slot.
    pub fn set(&mut self, slot: u8, color: Rgb<u8>) {
        self.colors[usize::from(slot)] = color;
    }

    /// Packed `r, g, b` triples as stored by the container formats.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.0.iter().copied()).collect()
    }
}

impl Index<u8> for Palette {
    type Output = Rgb<u8>;

    fn index(&self, slot: u8) -> &Rgb<u8> {
        &self.colors[usize::from(slot)]
    }
}

/// Content colors of a quantized palette section together with the index map
/// that sends every histogram color to its slot.
#[derive(Debug, Clone, Default)]
pub struct QuantizedColors {
    /// One color per slot, padded up to the budget
    pub colors: Vec<Rgb<u8>>,
    /// Histogram color to slot
    pub index_map: ColorIndexMap,
}

impl QuantizedColors {
    /// Assigns slots to `clusters` in order and pads with zero-colored fillers up to `budget`.
    pub fn from_clusters(mut clusters: Vec<Cluster>, budget: usize) -> Self {
        debug_assert!(clusters.len() <= budget && budget <= PALETTE_SIZE);
        clusters.resize_with(budget, Cluster::filler);

        let mut index_map = ColorIndexMap::new();
        for (slot, cluster) in clusters.iter().enumerate() {
            for member in &cluster.members {
                index_map.insert(*member, slot as u8);
            }
        }
        Self {
            colors: clusters.iter().map(|c| c.color.to_rgb()).collect(),
            index_map,
        }
    }
}

/// Grayscale ramp `0..=254` followed by `color` in the last slot.
pub fn ramp_palette(color: Rgb<u8>) -> Palette {
    let mut palette = Palette::from_colors((0..LAST_SLOT).map(|i| Rgb([i, i, i])));
    palette.set(LAST_SLOT, color);
    palette
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let color_list = self
            .colors
            .iter()
            .map(|rgb| format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]))
            .join(", ");

        write!(f, "Color Palette {{ {} }}", color_list)
    }
}
