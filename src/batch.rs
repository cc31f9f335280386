//! Building many textures at once.

use log::{info, warn};
use rayon::prelude::*;

use crate::error::BuildError;
use crate::settings::TextureSettings;
use crate::texture::{IndexedTexture, Resampler, TextureFrameBuilder, TextureKind, TextureSource};

/// One texture of a batch.
#[derive(Debug, Clone)]
pub struct TextureJob {
    /// Source images
    pub source: TextureSource,
    /// Palette layout
    pub kind: TextureKind,
    /// Settings for this texture
    pub settings: TextureSettings,
    /// Frame of an animation
    pub animated: bool,
}

impl TextureJob {
    /// Derives kind and animation from the texture name.
    pub fn from_source(source: TextureSource, settings: TextureSettings) -> Self {
        Self {
            kind: TextureKind::from_texture_name(&source.name),
            animated: crate::texture::is_animated_texture_name(&source.name),
            source,
            settings,
        }
    }
}

/// Outcome of a batch build.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Textures that were built, in job order
    pub built: Vec<IndexedTexture>,
    /// Name and error of every texture that failed, in job order
    pub failed: Vec<(String, BuildError)>,
}

impl BatchReport {
    /// One line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} textures built, {} failed",
            self.built.len(),
            self.failed.len()
        )
    }
}

/// Builds all jobs in parallel. A failing texture is reported and skipped.
pub fn build_textures<R>(builder: &TextureFrameBuilder<R>, jobs: &[TextureJob]) -> BatchReport
where
    R: Resampler + Sync,
{
    let results: Vec<_> = jobs
        .par_iter()
        .map(|job| {
            builder
                .build_texture(&job.source, job.kind, &job.settings, job.animated)
                .map_err(|err| (job.source.name.clone(), err))
        })
        .collect();

    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(texture) => report.built.push(texture),
            Err((name, err)) => {
                warn!("failed to build '{}': {}", name, err);
                report.failed.push((name, err));
            }
        }
    }
    info!("{}", report.summary());
    report
}
