//! Building textures and sprites from true-color frames.

use image::{imageops, RgbaImage};
use log::debug;

use crate::dither::Dithering;
use crate::error::BuildError;
use crate::layout::layout_for;
use crate::palette::Palette;
use crate::settings::{TextureSettings, MAX_TEXTURE_NAME_LENGTH};

/// Number of mipmap levels below the main image.
pub const MIPMAP_LEVELS: usize = 3;

/// Texture and sprite kinds, each with its own palette layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Every slot is an image color
    Normal,
    /// Slot 255 is a transparent color key
    Transparent,
    /// Slots 3 and 4 hold the underwater fog
    Water,
    /// Grayscale ramp with one decal color
    Decal,
    /// The last 32 slots are unaffected by lighting
    Fullbright,
    /// Sprite ramp with one flat color
    IndexAlpha,
    /// Bitmap font, never buildable
    Font,
}

impl Default for TextureKind {
    fn default() -> Self {
        TextureKind::Normal
    }
}

impl TextureKind {
    /// Kind implied by the GoldSrc naming convention.
    pub fn from_texture_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with('{') {
            TextureKind::Transparent
        } else if lower.starts_with('!') || lower.starts_with("water") {
            TextureKind::Water
        } else if lower.starts_with('~') {
            TextureKind::Fullbright
        } else {
            TextureKind::Normal
        }
    }

    /// Like [`from_texture_name`](Self::from_texture_name); everything in a decal WAD is a decal.
    pub fn from_texture_name_in(name: &str, decal_wad: bool) -> Self {
        if decal_wad {
            TextureKind::Decal
        } else {
            Self::from_texture_name(name)
        }
    }
}

/// Whether `name` is a frame of an animated texture (`+0` to `+9`, `+a` to `+j`).
pub fn is_animated_texture_name(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next().map(|c| c.to_ascii_lowercase())) {
        (Some('+'), Some(frame)) => frame.is_ascii_digit() || ('a'..='j').contains(&frame),
        _ => false,
    }
}

/// Rescales images. Mipmap synthesis only decides the target size.
pub trait Resampler {
    /// Resamples `image` to `width` x `height`.
    fn resize(&self, image: &RgbaImage, width: u32, height: u32) -> RgbaImage;
}

/// Area-averaging downscaler from the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AreaResampler;

impl Resampler for AreaResampler {
    fn resize(&self, image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        imageops::thumbnail(image, width, height)
    }
}

/// Source images of one texture.
#[derive(Debug, Clone, Default)]
pub struct TextureSource {
    /// Texture name
    pub name: String,
    /// Full size image
    pub main: Option<RgbaImage>,
    /// Optional prepared mipmaps, level 1 to 3
    pub mipmaps: [Option<RgbaImage>; MIPMAP_LEVELS],
    /// Fullbright mask, same size as the main image
    pub fullbright_mask: Option<RgbaImage>,
}

impl TextureSource {
    /// A texture with only a main image.
    pub fn new(name: impl Into<String>, main: RgbaImage) -> Self {
        Self {
            name: name.into(),
            main: Some(main),
            ..Default::default()
        }
    }
}

/// A texture ready for a WAD or BSP writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedTexture {
    /// Texture name
    pub name: String,
    /// Width of the main image
    pub width: u32,
    /// Height of the main image
    pub height: u32,
    /// Shared palette
    pub palette: Palette,
    /// Index buffers of the main image and its three mipmaps
    pub mipmaps: Vec<Vec<u8>>,
}

/// One sprite frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Palette indices, row by row
    pub indices: Vec<u8>,
}

/// A sprite ready for an SPR writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSprite {
    /// Sprite name
    pub name: String,
    /// Palette shared by all frames
    pub palette: Palette,
    /// Frames in order
    pub frames: Vec<IndexedFrame>,
}

fn validate_name(name: &str) -> Result<(), BuildError> {
    if name.is_empty() || !name.is_ascii() {
        return Err(BuildError::InvalidName(name.to_owned()));
    }
    if name.len() > MAX_TEXTURE_NAME_LENGTH {
        return Err(BuildError::NameTooLong {
            name: name.to_owned(),
            max: MAX_TEXTURE_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Builds textures and sprites.
#[derive(Debug, Default, Clone)]
pub struct TextureFrameBuilder<R = AreaResampler> {
    resampler: R,
}

impl<R: Resampler> TextureFrameBuilder<R> {
    /// Uses `resampler` to synthesize missing mipmaps.
    pub fn new(resampler: R) -> Self {
        Self { resampler }
    }

    /// The resampler used for missing mipmaps
    pub fn resampler(&self) -> &R {
        &self.resampler
    }

    /// Builds a texture and its four mip levels on one shared palette.
    ///
    /// Missing mipmaps are resampled from the main image. `animated` disables
    /// dithering.
    pub fn build_texture(
        &self,
        source: &TextureSource,
        kind: TextureKind,
        settings: &TextureSettings,
        animated: bool,
    ) -> Result<IndexedTexture, BuildError> {
        validate_name(&source.name)?;
        let main = source
            .main
            .as_ref()
            .ok_or_else(|| BuildError::MissingMainImage(source.name.clone()))?;
        let (width, height) = main.dimensions();
        if width == 0 || height == 0 || width % 16 != 0 || height % 16 != 0 {
            return Err(BuildError::InvalidDimensions {
                width,
                height,
                reason: "texture sides must be non-zero multiples of 16",
            });
        }

        let mut images = Vec::with_capacity(MIPMAP_LEVELS + 1);
        images.push(main.clone());
        for (i, mipmap) in source.mipmaps.iter().enumerate() {
            let level = i + 1;
            let (expected_width, expected_height) = (width >> level, height >> level);
            match mipmap {
                Some(mipmap) => {
                    if mipmap.dimensions() != (expected_width, expected_height) {
                        return Err(BuildError::MipmapSizeMismatch {
                            level,
                            width: mipmap.width(),
                            height: mipmap.height(),
                            expected_width,
                            expected_height,
                        });
                    }
                    images.push(mipmap.clone());
                }
                None => {
                    debug!("{}: synthesizing mipmap {}", source.name, level);
                    images.push(self.resampler.resize(main, expected_width, expected_height));
                }
            }
        }

        let masks = match (kind, &source.fullbright_mask) {
            (TextureKind::Fullbright, Some(mask)) => {
                if mask.dimensions() != (width, height) {
                    return Err(BuildError::InvalidDimensions {
                        width: mask.width(),
                        height: mask.height(),
                        reason: "fullbright mask must match the main image",
                    });
                }
                self.mask_levels(mask)
            }
            (TextureKind::Fullbright, None) => {
                return Err(BuildError::MissingFullbrightMask(source.name.clone()))
            }
            _ => Vec::new(),
        };

        let layout = layout_for(kind, settings, masks)?;
        let compiled = layout.compile(&images, Dithering::from_settings(settings, animated));
        debug!("{}: built {:?} texture {}x{}", source.name, kind, width, height);
        Ok(IndexedTexture {
            name: source.name.clone(),
            width,
            height,
            palette: compiled.palette,
            mipmaps: compiled.indices,
        })
    }

    /// Builds a sprite whose frames share one palette.
    ///
    /// Fullbright sprites take their masks from `fullbright_masks`, one per frame.
    pub fn build_sprite(
        &self,
        name: &str,
        frames: &[RgbaImage],
        fullbright_masks: Vec<RgbaImage>,
        kind: TextureKind,
        settings: &TextureSettings,
        animated: bool,
    ) -> Result<IndexedSprite, BuildError> {
        validate_name(name)?;
        if frames.is_empty() {
            return Err(BuildError::EmptySprite(name.to_owned()));
        }
        if let Some(frame) = frames.iter().find(|f| f.width() == 0 || f.height() == 0) {
            return Err(BuildError::InvalidDimensions {
                width: frame.width(),
                height: frame.height(),
                reason: "sprite frames must not be empty",
            });
        }
        if kind == TextureKind::Fullbright {
            if fullbright_masks.len() != frames.len() {
                return Err(BuildError::MissingFullbrightMask(name.to_owned()));
            }
            for (frame, mask) in frames.iter().zip(&fullbright_masks) {
                if mask.dimensions() != frame.dimensions() {
                    return Err(BuildError::InvalidDimensions {
                        width: mask.width(),
                        height: mask.height(),
                        reason: "fullbright mask must match its frame",
                    });
                }
            }
        }

        let layout = layout_for(kind, settings, fullbright_masks)?;
        let compiled = layout.compile(frames, Dithering::from_settings(settings, animated));
        Ok(IndexedSprite {
            name: name.to_owned(),
            palette: compiled.palette,
            frames: frames
                .iter()
                .zip(compiled.indices)
                .map(|(frame, indices)| IndexedFrame {
                    width: frame.width(),
                    height: frame.height(),
                    indices,
                })
                .collect(),
        })
    }

    fn mask_levels(&self, mask: &RgbaImage) -> Vec<RgbaImage> {
        let (width, height) = mask.dimensions();
        let mut levels = vec![mask.clone()];
        for level in 1..=MIPMAP_LEVELS {
            levels.push(self.resampler.resize(mask, width >> level, height >> level));
        }
        levels
    }
}
