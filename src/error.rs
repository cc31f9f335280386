use thiserror::Error;

use crate::TextureKind;

/// Reasons a single texture or sprite cannot be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No main image was provided
    #[error("texture '{0}' has no main image")]
    MissingMainImage(String),

    /// Image dimensions the target format cannot store
    #[error("image size {width}x{height} is invalid: {reason}")]
    InvalidDimensions {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
        /// Violated constraint
        reason: &'static str,
    },

    /// A provided mipmap does not have half the size of the level above it
    #[error("mipmap {level} is {width}x{height}, expected {expected_width}x{expected_height}")]
    MipmapSizeMismatch {
        /// Mipmap level, 1 to 3
        level: usize,
        /// Actual width
        width: u32,
        /// Actual height
        height: u32,
        /// Required width
        expected_width: u32,
        /// Required height
        expected_height: u32,
    },

    /// The kind is known but cannot be built
    #[error("{0:?} textures are not supported")]
    UnsupportedKind(TextureKind),

    /// Name longer than the container allows
    #[error("name '{name}' is longer than {max} characters")]
    NameTooLong {
        /// Offending name
        name: String,
        /// Maximum length
        max: usize,
    },

    /// Name that cannot be stored as an ASCII string
    #[error("name '{0}' must be non-empty ASCII")]
    InvalidName(String),

    /// Fullbright textures need one mask image per frame
    #[error("fullbright texture '{0}' needs one mask image per frame")]
    MissingFullbrightMask(String),

    /// A sprite without frames
    #[error("sprite '{0}' has no frames")]
    EmptySprite(String),
}
