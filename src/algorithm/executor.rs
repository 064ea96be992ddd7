//! Per-target job orchestration
//!
//! A job runs its stages strictly in order: load (and optionally shrink) the
//! target, narrow the library to a palette when asked, render the tile set,
//! match and compose, then write the outputs. Only the stages themselves are
//! parallel.

use crate::algorithm::assembler::{MosaicAssembler, TileSet, mosaic_dimensions};
use crate::algorithm::selection::PaletteSelector;
use crate::analysis::palette::{HueWheel, MedianCut};
use crate::io::configuration::{MosaicConfig, PaletteSource};
use crate::io::error::Result;
use crate::io::image::{ImageCodec, PixelGrid};
use crate::io::progress::ProgressManager;
use crate::library::TileLibrary;
use crate::library::store::LibraryStore;
use crate::render::derivatives::{ArtifactPaths, DerivativeReport, DerivativeRenderer};
use indicatif::ProgressBar;
use log::info;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Ordered stages of a mosaic job
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Decode and resize the target
    LoadTarget,
    /// Palette-constrained narrowing of the library
    SelectTiles,
    /// Render tiles at the mosaic tile size
    PrepareTiles,
    /// Match every target pixel and compose the mosaic
    Assemble,
    /// Encode the mosaic and its derivatives
    WriteOutputs,
}

impl Stage {
    /// Number of stages in a job
    pub const COUNT: usize = 5;

    /// Position of the stage, starting at 1
    pub const fn number(self) -> usize {
        self as usize + 1
    }

    /// Short label for progress display
    pub const fn label(self) -> &'static str {
        match self {
            Self::LoadTarget => "loading",
            Self::SelectTiles => "palette",
            Self::PrepareTiles => "tiles",
            Self::Assemble => "matching",
            Self::WriteOutputs => "writing",
        }
    }
}

/// What a finished job produced
#[derive(Debug)]
pub struct JobReport {
    /// Target image the mosaic reproduces
    pub target: PathBuf,
    /// Target dimensions after the optional resize
    pub target_size: (u32, u32),
    /// Mosaic dimensions
    pub mosaic_size: (u32, u32),
    /// Number of tiles the matcher could choose from
    pub tiles_used: usize,
    /// Full-resolution mosaic, when enabled
    pub fullres: Option<PathBuf>,
    /// Outcome of the derivative artifacts
    pub derivatives: DerivativeReport,
}

/// Load the tile library described by `config`, through the cache when one is configured
///
/// # Errors
///
/// Propagates library build errors and cache write errors
pub fn load_library<C: ImageCodec>(
    config: &MosaicConfig,
    codec: &C,
    progress: Option<&ProgressBar>,
) -> Result<TileLibrary> {
    match &config.cache_dir {
        Some(dir) => LibraryStore::new(dir).load_or_build(&config.tiles_dir, &config.library, codec, progress),
        None => TileLibrary::build(&config.tiles_dir, &config.library, codec, progress),
    }
}

/// Builds mosaics of individual targets against one shared library
pub struct MosaicJob<'a, C: ImageCodec> {
    config: &'a MosaicConfig,
    library: &'a TileLibrary,
    codec: &'a C,
}

impl<'a, C: ImageCodec> MosaicJob<'a, C> {
    /// Job drawing tiles from `library` under `config`
    pub const fn new(config: &'a MosaicConfig, library: &'a TileLibrary, codec: &'a C) -> Self {
        Self {
            config,
            library,
            codec,
        }
    }

    /// Output locations for `target`
    pub fn output_paths(&self, target: &Path) -> ArtifactPaths {
        let stem = target.file_stem().unwrap_or_default().to_string_lossy();
        ArtifactPaths::for_target(&self.config.output_dir, &stem, &self.config.output_extension)
    }

    /// Decode `target` and apply the configured resize
    ///
    /// # Errors
    ///
    /// Returns a decode error or a configuration error for an invalid size
    pub fn load_target(&self, target: &Path) -> Result<PixelGrid> {
        let image = self.codec.load(target)?;
        match self.config.target_size {
            Some(size) => {
                let (width, height) = size.resolve(image.width(), image.height())?;
                Ok(self.codec.resize(&image, width, height))
            }
            None => Ok(image),
        }
    }

    /// Tiles the matcher may use for `target`
    ///
    /// The whole library, or its palette-constrained subset when `num_images`
    /// is set.
    ///
    /// # Errors
    ///
    /// Propagates palette extraction, reference decoding and capacity errors
    pub fn tile_source(&self, target: &PixelGrid) -> Result<Cow<'a, TileLibrary>> {
        let Some(count) = self.config.num_images else {
            return Ok(Cow::Borrowed(self.library));
        };

        let metric = self.config.metric;
        let selected = match &self.config.palette_source {
            PaletteSource::Target => {
                PaletteSelector::new(&MedianCut::default(), metric).select(self.library, target, count)?
            }
            PaletteSource::Image(path) => {
                let reference = self.codec.load(path)?;
                PaletteSelector::new(&MedianCut::default(), metric).select(self.library, &reference, count)?
            }
            PaletteSource::HueWheel => {
                PaletteSelector::new(&HueWheel, metric).select(self.library, target, count)?
            }
        };
        Ok(Cow::Owned(selected))
    }

    /// Build the mosaic of `target` and write every enabled output
    ///
    /// `index` identifies the target in `progress`.
    ///
    /// # Errors
    ///
    /// Any failure except an encoder rejecting a single derivative aborts
    /// the job
    pub fn run(
        &self,
        target: &Path,
        index: usize,
        mut progress: Option<&mut ProgressManager>,
    ) -> Result<JobReport> {
        let start_time = Instant::now();
        let tile_size = self.config.tile_size;

        advance(&mut progress, index, Stage::LoadTarget);
        let image = self.load_target(target)?;
        let target_size = image.dimensions();
        let mosaic_size = mosaic_dimensions(target_size.0, target_size.1, tile_size)?;

        advance(&mut progress, index, Stage::SelectTiles);
        let tiles = self.tile_source(&image)?;

        advance(&mut progress, index, Stage::PrepareTiles);
        let tile_set = TileSet::prepare(&tiles, tile_size, self.codec)?;

        advance(&mut progress, index, Stage::Assemble);
        let bar = progress
            .as_deref()
            .map(|pm| pm.task_bar(u64::from(target_size.1), "matching rows"));
        let mosaic = MosaicAssembler::new(&tile_set, self.config.metric).assemble(&image, bar.as_ref());
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        let mosaic = mosaic?;

        advance(&mut progress, index, Stage::WriteOutputs);
        let paths = self.output_paths(target);
        let outputs = &self.config.outputs;
        let fullres = if outputs.fullres {
            self.codec.save(&mosaic, &paths.fullres)?;
            Some(paths.fullres.clone())
        } else {
            None
        };

        let derivatives = DerivativeRenderer::new(
            self.codec,
            tile_size,
            self.config.zoom,
            self.config.output_extension.clone(),
        )
        .write_all(&mosaic, target_size, outputs, &paths)?;

        info!(
            "{}: {}x{} mosaic from {} tiles in {:.1?}",
            target.display(),
            mosaic_size.0,
            mosaic_size.1,
            tile_set.len(),
            start_time.elapsed()
        );

        Ok(JobReport {
            target: target.to_path_buf(),
            target_size,
            mosaic_size,
            tiles_used: tile_set.len(),
            fullres,
            derivatives,
        })
    }
}

fn advance(progress: &mut Option<&mut ProgressManager>, index: usize, stage: Stage) {
    if let Some(pm) = progress.as_deref_mut() {
        pm.advance(index, stage);
    }
}
