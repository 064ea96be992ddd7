//! Command-line interface for batch mosaic generation

use crate::algorithm::executor::{MosaicJob, load_library};
use crate::algorithm::matcher::DistanceMetric;
use crate::io::configuration::{
    DEFAULT_DISPLAY_SIZE, DEFAULT_MAX_COLOR_DEVIATION, DEFAULT_MAX_CONTRAST,
    DEFAULT_MIN_TILE_SPAN, DEFAULT_OUTPUT_EXTENSION, DEFAULT_QUALITY, DEFAULT_TILE_SIZE,
    DEFAULT_ZOOM_INCREMENT, DEFAULT_ZOOM_START, FilterParams, LibraryParams,
    MOSAIC_SUFFIX, MosaicConfig, OutputToggles, PaletteSource, TargetSize, ZoomSettings,
};
use crate::io::error::{Result, fs_error, invalid_parameter};
use crate::io::image::{FileCodec, is_supported_image};
use crate::io::progress::ProgressManager;
use crate::library::TileLibrary;
use crate::render::derivatives::ArtifactPaths;
use clap::Parser;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "photomosaic")]
#[command(
    author,
    version,
    about = "Rebuild images as mosaics of color-matched tile images"
)]
/// Command-line arguments for the mosaic tool
// One switch per output artifact plus the batch flags
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Target image or directory of target images
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Folder of candidate tile images
    #[arg(short, long, value_name = "DIR")]
    pub tiles: PathBuf,

    /// Output folder (defaults to the target's folder)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Keep the curated library here and reuse it between runs
    #[arg(short, long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Reject tiles whose pixels deviate more than this from their mean color (0-765)
    #[arg(long, default_value_t = DEFAULT_MAX_COLOR_DEVIATION)]
    pub max_color_deviation: u32,

    /// Reject tiles with edge-to-edge contrast above this (0-765)
    #[arg(long, default_value_t = DEFAULT_MAX_CONTRAST)]
    pub max_contrast: u32,

    /// Drop tiles within this Manhattan distance of an already accepted tile's color
    #[arg(long)]
    pub min_color_diff: Option<u32>,

    /// Normalize source images to this square size before deduplication
    #[arg(long, value_name = "PX")]
    pub working_size: Option<u32>,

    /// Store accepted tiles at this square size
    #[arg(long, value_name = "PX")]
    pub storage_size: Option<u32>,

    /// Edge length of each tile in the mosaic
    #[arg(short = 's', long, default_value_t = DEFAULT_TILE_SIZE, value_name = "PX")]
    pub images_size: u32,

    /// Use only this many distinct tiles, chosen to match a palette (3-255)
    #[arg(short = 'k', long)]
    pub num_images: Option<usize>,

    /// Take the palette from this image instead of the target
    #[arg(long, value_name = "IMAGE", conflicts_with = "hue_wheel")]
    pub palette: Option<PathBuf>,

    /// Use evenly spaced saturated hues as the palette
    #[arg(long)]
    pub hue_wheel: bool,

    /// Color distance for matching and palette selection
    #[arg(long, value_enum, default_value_t = DistanceMetric::default())]
    pub metric: DistanceMetric,

    /// Lossy encoding quality (1-100)
    #[arg(long, default_value_t = DEFAULT_QUALITY)]
    pub quality: u8,

    /// Raster output format
    #[arg(long, default_value = DEFAULT_OUTPUT_EXTENSION, value_name = "EXT")]
    pub format: String,

    /// Resize the target to this width first (height follows unless given)
    #[arg(short = 'w', long)]
    pub width: Option<u32>,

    /// Resize the target to this height first (width follows unless given)
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// First zoom factor
    #[arg(long, default_value_t = DEFAULT_ZOOM_START)]
    pub zoom_start: f64,

    /// Zoom factor increment between frames
    #[arg(long, default_value_t = DEFAULT_ZOOM_INCREMENT)]
    pub zoom_incr: f64,

    /// Stop zooming once the view spans this many tiles
    #[arg(long, default_value_t = DEFAULT_MIN_TILE_SPAN)]
    pub min_tile_span: u32,

    /// Cap on the number of zoom frames
    #[arg(long)]
    pub max_zoomed_images: Option<usize>,

    /// Width of the box zoom frames are fitted into
    #[arg(long, default_value_t = DEFAULT_DISPLAY_SIZE.0)]
    pub display_width: u32,

    /// Height of the box zoom frames are fitted into
    #[arg(long, default_value_t = DEFAULT_DISPLAY_SIZE.1)]
    pub display_height: u32,

    /// Skip the full-resolution mosaic
    #[arg(long)]
    pub no_fullres: bool,

    /// Skip the lowres overview
    #[arg(long)]
    pub no_lowres: bool,

    /// Save zoom stills
    #[arg(long)]
    pub zooms: bool,

    /// Save the zoom-in GIF
    #[arg(long)]
    pub gif: bool,

    /// Save the zoom-out GIF
    #[arg(long)]
    pub gif_reversed: bool,

    /// Save zoom-in frames for video muxing
    #[arg(long)]
    pub vid: bool,

    /// Save zoom-out frames for video muxing
    #[arg(long)]
    pub vid_reversed: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process targets even if their mosaic exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Folder receiving the outputs
    pub fn output_dir(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        if self.target.is_dir() {
            return self.target.clone();
        }
        match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Job configuration described by the arguments
    pub fn to_config(&self) -> MosaicConfig {
        let target_size = (self.width.is_some() || self.height.is_some()).then_some(TargetSize {
            width: self.width,
            height: self.height,
        });
        let palette_source = match (&self.palette, self.hue_wheel) {
            (Some(path), _) => PaletteSource::Image(path.clone()),
            (None, true) => PaletteSource::HueWheel,
            (None, false) => PaletteSource::Target,
        };

        MosaicConfig {
            cache_dir: self.cache.clone(),
            library: LibraryParams {
                filter: FilterParams {
                    max_color_deviation: self.max_color_deviation,
                    max_contrast: self.max_contrast,
                    min_color_diff: self.min_color_diff,
                },
                working_size: self.working_size,
                storage_size: self.storage_size,
            },
            tile_size: self.images_size,
            num_images: self.num_images,
            palette_source,
            metric: self.metric,
            quality: self.quality,
            target_size,
            zoom: ZoomSettings {
                start: self.zoom_start,
                increment: self.zoom_incr,
                min_tile_span: self.min_tile_span,
                max_images: self.max_zoomed_images,
                display_width: self.display_width,
                display_height: self.display_height,
            },
            outputs: OutputToggles {
                fullres: !self.no_fullres,
                lowres: !self.no_lowres,
                zooms: self.zooms,
                gif: self.gif,
                gif_reversed: self.gif_reversed,
                frames: self.vid,
                frames_reversed: self.vid_reversed,
            },
            output_extension: self.format.to_ascii_lowercase(),
            ..MosaicConfig::new(&self.tiles, self.output_dir())
        }
    }
}

/// Orchestrates batch processing of target images with progress tracking
pub struct FileProcessor {
    cli: Cli,
    config: MosaicConfig,
    codec: FileCodec,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);
        let config = cli.to_config();
        let codec = FileCodec::new(config.quality);

        Self {
            cli,
            config,
            codec,
            progress_manager,
        }
    }

    /// Configuration every target is processed with
    pub const fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Process targets according to CLI arguments
    ///
    /// The library is built (or loaded from the cache) once and shared by
    /// every target.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the library cannot
    /// be built, or any target fails
    pub fn process(&mut self) -> Result<()> {
        self.config.validate()?;
        let files = self.collect_files()?;

        if files.is_empty() {
            info!("Nothing to do: every target already has a mosaic");
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        let library = self.load_library()?;
        for (index, file) in files.iter().enumerate() {
            self.process_file(&library, file, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    fn load_library(&self) -> Result<TileLibrary> {
        let bar = self
            .progress_manager
            .as_ref()
            .map(|pm| pm.task_bar(0, "decoding tiles"));
        let library = load_library(&self.config, &self.codec, bar.as_ref());
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        library
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if !is_supported_image(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"not a decodable image",
                ));
            }
            Ok(if self.should_process_file(target) {
                vec![target.clone()]
            } else {
                vec![]
            })
        } else if target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(target).map_err(fs_error(target, "list directory"))? {
                let path = entry.map_err(fs_error(target, "list directory"))?.path();
                if is_supported_image(&path)
                    && !ArtifactPaths::is_artifact_file(&path)
                    && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"must be an image file or a directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let stem = input_path.file_stem().unwrap_or_default().to_string_lossy();
        let output_path = self
            .config
            .output_dir
            .join(format!("{stem}{MOSAIC_SUFFIX}.{}", self.config.output_extension));
        if output_path.exists() {
            // Allow print for user feedback for progress messages
            #[allow(clippy::print_stderr)]
            if !self.cli.quiet {
                eprintln!("Skipping: {} (output exists)", input_path.display());
            }
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, library: &TileLibrary, input_path: &Path, index: usize) -> Result<()> {
        let start_time = Instant::now();

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_target(index, input_path);
        }

        let job = MosaicJob::new(&self.config, library, &self.codec);
        let report = job.run(input_path, index, self.progress_manager.as_mut())?;
        for (artifact, error) in &report.derivatives.failed {
            warn!("{}: {artifact} not written: {error}", input_path.display());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_target(index, start_time.elapsed());
        }

        Ok(())
    }
}
