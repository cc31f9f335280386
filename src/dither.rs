//! Mapping frames onto palette indices.

use std::mem;

use image::{Rgb, Rgba, RgbaImage};
use log::debug;

use crate::settings::{DitheringAlgorithm, TextureSettings};

/// Largest error a channel can carry to its neighbours.
const MAX_ERROR: i32 = 255;

/// Dithering resolved for one build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dithering {
    /// Algorithm
    pub algorithm: DitheringAlgorithm,
    /// Error diffusion strength, `0.0..=1.0`
    pub scale: f32,
}

impl Dithering {
    /// Reads the settings. Frames of an animation are never dithered, since
    /// independent noise in every frame flickers.
    pub fn from_settings(settings: &TextureSettings, animated: bool) -> Self {
        let mut algorithm = settings.dithering_algorithm();
        if animated && algorithm != DitheringAlgorithm::None {
            debug!("animated frames, dithering disabled");
            algorithm = DitheringAlgorithm::None;
        }
        Self {
            algorithm,
            scale: settings.dither_scale(),
        }
    }
}

/// Maps every pixel through `get_index` without diffusing any error.
pub fn none(frame: &RgbaImage, mut get_index: impl FnMut(Rgba<u8>) -> u8) -> Vec<u8> {
    frame.pixels().map(|pixel| get_index(*pixel)).collect()
}

/// Floyd–Steinberg error diffusion.
///
/// Keeps the accumulated error of the current and the previous scanline.
#[derive(Debug, Clone, Default)]
pub struct FloydSteinberg {
    previous_row: Vec<[i32; 3]>,
    current_row: Vec<[i32; 3]>,
}

impl FloydSteinberg {
    /// Error buffers for frames `width` pixels wide
    pub fn new(width: u32) -> Self {
        let width = width as usize;
        Self {
            previous_row: vec![[0; 3]; width],
            current_row: vec![[0; 3]; width],
        }
    }

    /// Clears the error state before a new frame.
    pub fn reset(&mut self, width: u32) {
        let width = width as usize;
        for row in [&mut self.previous_row, &mut self.current_row] {
            row.clear();
            row.resize(width, [0; 3]);
        }
    }

    /// Quantizes `frame` with error diffusion.
    ///
    /// `palette` resolves the slots `get_index` returns. Pixels for which `skip`
    /// holds are mapped as they are and pass no error on.
    pub fn disperse(
        &mut self,
        frame: &RgbaImage,
        palette: &[Rgb<u8>],
        get_index: impl FnMut(Rgba<u8>) -> u8,
        scale: f32,
        skip: impl Fn(&Rgba<u8>) -> bool,
    ) -> Vec<u8> {
        self.disperse_where(frame, palette, get_index, scale, |_, _, color| skip(color))
    }

    /// Like [`disperse`](Self::disperse), with a skip predicate that also sees the pixel position.
    pub fn disperse_where(
        &mut self,
        frame: &RgbaImage,
        palette: &[Rgb<u8>],
        mut get_index: impl FnMut(Rgba<u8>) -> u8,
        scale: f32,
        skip: impl Fn(u32, u32, &Rgba<u8>) -> bool,
    ) -> Vec<u8> {
        let (width, height) = frame.dimensions();
        self.reset(width);
        let width = width as usize;

        let mut indices = Vec::with_capacity(width * height as usize);
        for y in 0..height {
            for x in 0..width {
                let source = *frame.get_pixel(x as u32, y);
                if skip(x as u32, y, &source) {
                    indices.push(get_index(source));
                    self.current_row[x] = [0; 3];
                    continue;
                }

                let error = self.incoming_error(x);
                let mut corrected = source;
                for channel in 0..3 {
                    let diffused = (error[channel] as f32 * scale / 16.0).round() as i32;
                    corrected[channel] =
                        (i32::from(source[channel]) + diffused).max(0).min(255) as u8;
                }

                let index = get_index(corrected);
                indices.push(index);

                let target = palette
                    .get(usize::from(index))
                    .copied()
                    .unwrap_or(Rgb([0; 3]));
                let mut outgoing = [0; 3];
                for channel in 0..3 {
                    outgoing[channel] = (i32::from(source[channel])
                        - i32::from(target[channel]))
                    .max(-MAX_ERROR)
                    .min(MAX_ERROR);
                }
                self.current_row[x] = outgoing;
            }
            mem::swap(&mut self.previous_row, &mut self.current_row);
        }
        indices
    }

    /// Sum of neighbour errors weighted by 16ths: W 7, NW 1, N 5, NE 3.
    fn incoming_error(&self, x: usize) -> [i32; 3] {
        let zero = [0; 3];
        let west = if x > 0 { self.current_row[x - 1] } else { zero };
        let north_west = if x > 0 { self.previous_row[x - 1] } else { zero };
        let north = self.previous_row[x];
        let north_east = self.previous_row.get(x + 1).copied().unwrap_or(zero);

        let mut error = [0; 3];
        for (channel, sum) in error.iter_mut().enumerate() {
            *sum = 7 * west[channel]
                + north_west[channel]
                + 5 * north[channel]
                + 3 * north_east[channel];
        }
        error
    }

    #[cfg(test)]
    fn errors(&self) -> impl Iterator<Item = &[i32; 3]> {
        self.previous_row.iter().chain(self.current_row.iter())
    }
}
