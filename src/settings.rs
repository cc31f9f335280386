//! Build settings and their defaults.

use image::{Rgb, Rgba};

/// Default strength of Floyd–Steinberg error diffusion.
pub const DEFAULT_DITHER_SCALE: f32 = 0.75;
/// Pixels with an alpha below this are transparent in color-keyed textures.
pub const DEFAULT_TRANSPARENCY_THRESHOLD: u8 = 128;
/// Mask pixels with an alpha at or above this mark fullbright pixels.
pub const DEFAULT_FULLBRIGHT_ALPHA_THRESHOLD: u8 = 128;
/// Longest texture or sprite name the container formats can store.
pub const MAX_TEXTURE_NAME_LENGTH: usize = 15;

/// Error diffusion algorithm used when mapping pixels onto the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DitheringAlgorithm {
    /// Nearest color only.
    None,
    /// Floyd–Steinberg error diffusion.
    FloydSteinberg,
}

impl Default for DitheringAlgorithm {
    fn default() -> Self {
        DitheringAlgorithm::FloydSteinberg
    }
}

/// Where decal and index-alpha textures take their per-pixel index from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecalTransparencySource {
    /// The alpha channel.
    AlphaChannel,
    /// The average of the red, green and blue channels.
    Grayscale,
}

impl Default for DecalTransparencySource {
    fn default() -> Self {
        DecalTransparencySource::AlphaChannel
    }
}

/// Per-texture overrides. Every unset field falls back to its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureSettings {
    /// Dithering algorithm
    pub dithering_algorithm: Option<DitheringAlgorithm>,
    /// Error diffusion strength, `0.0..=1.0`
    pub dither_scale: Option<f32>,
    /// Alpha threshold below which a pixel is transparent
    pub transparency_threshold: Option<u8>,
    /// Extra color treated as transparent
    pub transparency_color: Option<Rgb<u8>>,
    /// Water fog color; the alpha channel is the fog intensity
    pub water_fog_color: Option<Rgba<u8>>,
    /// Decal color
    pub decal_color: Option<Rgb<u8>>,
    /// Index source of decal and index-alpha textures
    pub decal_transparency_source: Option<DecalTransparencySource>,
    /// Alpha threshold of the fullbright mask
    pub fullbright_alpha_threshold: Option<u8>,
}

impl TextureSettings {
    /// Dithering algorithm, Floyd–Steinberg unless overridden.
    pub fn dithering_algorithm(&self) -> DitheringAlgorithm {
        self.dithering_algorithm.unwrap_or_default()
    }

    /// Dither scale clamped into `0.0..=1.0`.
    pub fn dither_scale(&self) -> f32 {
        let scale = self.dither_scale.unwrap_or(DEFAULT_DITHER_SCALE);
        if scale.is_nan() {
            DEFAULT_DITHER_SCALE
        } else {
            scale.max(0.0).min(1.0)
        }
    }

    /// Alpha threshold for color-keyed transparency.
    pub fn transparency_threshold(&self) -> u8 {
        self.transparency_threshold
            .unwrap_or(DEFAULT_TRANSPARENCY_THRESHOLD)
    }

    /// Index source for decals.
    pub fn decal_transparency_source(&self) -> DecalTransparencySource {
        self.decal_transparency_source.unwrap_or_default()
    }

    /// Alpha threshold for fullbright masks.
    pub fn fullbright_alpha_threshold(&self) -> u8 {
        self.fullbright_alpha_threshold
            .unwrap_or(DEFAULT_FULLBRIGHT_ALPHA_THRESHOLD)
    }

    /// Layers `other` on top of `self`: every field `other` sets wins.
    pub fn overlay(&self, other: &TextureSettings) -> TextureSettings {
        TextureSettings {
            dithering_algorithm: other.dithering_algorithm.or(self.dithering_algorithm),
            dither_scale: other.dither_scale.or(self.dither_scale),
            transparency_threshold: other
                .transparency_threshold
                .or(self.transparency_threshold),
            transparency_color: other.transparency_color.or(self.transparency_color),
            water_fog_color: other.water_fog_color.or(self.water_fog_color),
            decal_color: other.decal_color.or(self.decal_color),
            decal_transparency_source: other
                .decal_transparency_source
                .or(self.decal_transparency_source),
            fullbright_alpha_threshold: other
                .fullbright_alpha_threshold
                .or(self.fullbright_alpha_threshold),
        }
    }
}
