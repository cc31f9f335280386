use image::Rgba;

use crate::histogram::ColorHistogram;

mod median_cut;

pub use median_cut::MedianCut;

/// A group of colors that share one palette slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Representative color written to the palette
    pub color: Rgba<u8>,
    /// Histogram colors mapped onto this slot
    pub members: Vec<Rgba<u8>>,
}

impl Cluster {
    /// Cluster of a single color
    pub fn singleton(color: Rgba<u8>) -> Self {
        Self {
            color,
            members: vec![color],
        }
    }

    /// Zero-colored cluster without members, used to pad palettes
    pub fn filler() -> Self {
        Self {
            color: Rgba([0, 0, 0, 0]),
            members: Vec::new(),
        }
    }
}

/// Quantizer trait
pub trait Quantizer {
    /// Reduces the histogram to at most `max_colors` clusters.
    ///
    /// The order of the returned clusters is their palette slot order.
    fn quantize(&self, histogram: &ColorHistogram, max_colors: usize) -> Vec<Cluster>;
}
