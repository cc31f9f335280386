//! Nearest palette color lookup.

use image::{Rgb, Rgba};

use crate::palette::{ColorIndexMap, LAST_SLOT};

/// Index of the palette entry closest to `color` by squared RGB distance.
///
/// Alpha is ignored, ties go to the lowest index. An empty palette yields 0.
pub fn nearest_index(palette: &[Rgb<u8>], color: &Rgba<u8>) -> u8 {
    let mut best = (0, u32::MAX);
    for (index, entry) in palette.iter().enumerate() {
        let distance = entry
            .0
            .iter()
            .zip(color.0.iter())
            .map(|(&a, &b)| {
                let d = i32::from(a) - i32::from(b);
                (d * d) as u32
            })
            .sum::<u32>();
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best.0 as u8
}

/// Looks up palette slots, memoizing colors that were not part of the histogram.
pub struct NearestColorIndexer<'a, F> {
    palette: &'a [Rgb<u8>],
    cache: &'a mut ColorIndexMap,
    is_transparent: F,
}

impl<'a, F> NearestColorIndexer<'a, F>
where
    F: Fn(&Rgba<u8>) -> bool,
{
    /// Searches `palette`, which holds the slots the quantizer may hand out.
    pub fn new(palette: &'a [Rgb<u8>], cache: &'a mut ColorIndexMap, is_transparent: F) -> Self {
        debug_assert!(palette.len() <= 256);
        Self {
            palette,
            cache,
            is_transparent,
        }
    }

    /// Slot for `color`; transparent colors always get slot 255.
    pub fn index_of(&mut self, color: Rgba<u8>) -> u8 {
        if (self.is_transparent)(&color) {
            return LAST_SLOT;
        }
        self.nearest_of(color)
    }

    /// Closest searched slot for `color`, even if it is transparent.
    pub fn nearest_of(&mut self, color: Rgba<u8>) -> u8 {
        let palette = self.palette;
        *self
            .cache
            .entry(color)
            .or_insert_with(|| nearest_index(palette, &color))
    }
}
