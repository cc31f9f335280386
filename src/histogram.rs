use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use itertools::Itertools;

/// Occurrence count of every distinct color in one or more frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorHistogram {
    counts: HashMap<Rgba<u8>, usize>,
}

impl ColorHistogram {
    /// Counts the colors of all frames, skipping pixels for which `ignore` returns true
    pub fn from_frames<'a, I, F>(frames: I, mut ignore: F) -> Self
    where
        I: IntoIterator<Item = &'a RgbaImage>,
        F: FnMut(&Rgba<u8>) -> bool,
    {
        Self::from_pixels(
            frames
                .into_iter()
                .flat_map(|frame| frame.pixels().copied())
                .filter(|color| !ignore(color)),
        )
    }

    /// Counts an already filtered stream of pixels.
    pub fn from_pixels(pixels: impl IntoIterator<Item = Rgba<u8>>) -> Self {
        Self {
            counts: pixels.into_iter().counts(),
        }
    }

    /// Number of distinct colors
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no pixel was counted
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Occurrences of `color`, zero if it was never seen
    pub fn count_of(&self, color: &Rgba<u8>) -> usize {
        self.counts.get(color).copied().unwrap_or(0)
    }

    /// Distinct colors in no particular order
    pub fn colors(&self) -> impl Iterator<Item = Rgba<u8>> + '_ {
        self.counts.keys().copied()
    }

    /// Colors with their counts in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (Rgba<u8>, usize)> + '_ {
        self.counts.iter().map(|(&color, &count)| (color, count))
    }

    /// Occurrence-weighted average of all counted colors.
    pub fn average(&self) -> Option<Rgba<u8>> {
        weighted_average(self.iter())
    }
}

/// Weighted mean per channel, rounded to the nearest integer.
///
/// A total weight of zero counts every color once.
pub(crate) fn weighted_average(
    colors: impl IntoIterator<Item = (Rgba<u8>, usize)>,
) -> Option<Rgba<u8>> {
    let mut weighted = ([0u64; 4], 0u64);
    let mut flat = ([0u64; 4], 0u64);
    for (color, count) in colors {
        for (i, &channel) in color.0.iter().enumerate() {
            weighted.0[i] += count as u64 * u64::from(channel);
            flat.0[i] += u64::from(channel);
        }
        weighted.1 += count as u64;
        flat.1 += 1;
    }
    let (sums, weight) = if weighted.1 == 0 { flat } else { weighted };
    if weight == 0 {
        return None;
    }
    let mean = sums.map(|sum| ((sum + weight / 2) / weight) as u8);
    Some(Rgba(mean))
}
