//! Compile true-color images into GoldSrc palette textures and sprites
//!
//! Every texture of a `.wad` and every `.spr` sprite stores 8-bit indices into a 256 color
//! palette. This crate builds that palette from RGBA frames with a median cut quantizer, maps
//! the frames onto it with optional Floyd–Steinberg dithering and lays out the reserved slots
//! the engine expects for transparent, water, decal, fullbright and index-alpha textures.
//!
//! Reading images and writing the container formats is left to the caller.

#![deny(missing_docs)]

pub use crate::error::BuildError;
pub use crate::histogram::ColorHistogram;
pub use crate::indexer::{nearest_index, NearestColorIndexer};
pub use crate::palette::{ColorIndexMap, Palette, QuantizedColors, PALETTE_SIZE};
pub use crate::quantizer::*;
pub use crate::settings::{DecalTransparencySource, DitheringAlgorithm, TextureSettings};
pub use crate::texture::{
    is_animated_texture_name, AreaResampler, IndexedFrame, IndexedSprite, IndexedTexture,
    Resampler, TextureFrameBuilder, TextureKind, TextureSource,
};

pub mod batch;
pub mod dither;
mod error;
mod histogram;
mod indexer;
pub mod layout;
mod palette;
mod quantizer;
pub mod settings;
pub mod texture;
