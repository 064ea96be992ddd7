//! Pipeline constants and the validated job configuration record

use crate::algorithm::matcher::DistanceMetric;
use crate::io::error::{Result, invalid_parameter};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest summed absolute channel distance between two RGB colors (3 × 255)
pub const MAX_CHANNEL_DISTANCE: u32 = 765;

/// Default tile edge length in the assembled mosaic
pub const DEFAULT_TILE_SIZE: u32 = 50;

/// Default ceiling for the color deviation quality gate
pub const DEFAULT_MAX_COLOR_DEVIATION: u32 = 200;
/// Default ceiling for the contrast quality gate
pub const DEFAULT_MAX_CONTRAST: u32 = 200;

/// Edge length of the grid sampled by the color deviation check
pub const DEVIATION_TEST_SIZE: u32 = 10;
/// Grid sizes sampled by the contrast check
pub const CONTRAST_TEST_SIZES: [u32; 2] = [2, 3];

/// Lower bound for palette-constrained tile counts
pub const MIN_PALETTE_TILES: usize = 3;
/// Upper bound for palette-constrained tile counts
pub const MAX_PALETTE_TILES: usize = 255;

/// Pixels sampled per palette histogram entry (every Nth pixel)
pub const PALETTE_SAMPLE_STRIDE: usize = 10;
/// Bits kept per channel when bucketing colors for palette extraction
pub const PALETTE_SIGNIFICANT_BITS: u32 = 5;
/// Pixels brighter than this on every channel are ignored by palette extraction
pub const PALETTE_WHITE_THRESHOLD: u8 = 250;

/// Largest mosaic, in pixels, that will be composed
pub const MAX_MOSAIC_PIXELS: u64 = 1_000_000_000;

/// Default lossy encoding quality for raster outputs
pub const DEFAULT_QUALITY: u8 = 90;

/// Default first zoom factor of the zoom sequence
pub const DEFAULT_ZOOM_START: f64 = 1.25;
/// Default multiplicative zoom increment between frames
pub const DEFAULT_ZOOM_INCREMENT: f64 = 1.05;
/// Zooming stops once the crop window spans this many tiles or fewer
pub const DEFAULT_MIN_TILE_SPAN: u32 = 4;
/// Default bounding box for zoom frames
pub const DEFAULT_DISPLAY_SIZE: (u32, u32) = (1280, 720);

/// Delay between animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 40;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output naming
/// Suffix of the full-resolution mosaic
pub const MOSAIC_SUFFIX: &str = "_mosaic";
/// Suffix of the downsampled overview
pub const LOWRES_SUFFIX: &str = "_lowres";
/// Suffix of zoom outputs (still directory, animations, frame sequences)
pub const ZOOM_SUFFIX: &str = "_zoom";
/// Suffix appended to reversed animation outputs
pub const REVERSED_SUFFIX: &str = "_reversed";
/// Default raster output extension
pub const DEFAULT_OUTPUT_EXTENSION: &str = "jpg";
/// File name of the library cache manifest
pub const CACHE_MANIFEST: &str = "manifest.json";

/// Quality gates applied while curating the tile library
///
/// Both ceilings live in `[0, 765]`; 765 accepts every tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterParams {
    /// Largest accepted mean distance of a tile's pixels from its signature
    pub max_color_deviation: u32,
    /// Largest accepted edge-to-edge contrast
    pub max_contrast: u32,
    /// Drop tiles whose signature is this close (Manhattan) to an accepted one
    pub min_color_diff: Option<u32>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            max_color_deviation: DEFAULT_MAX_COLOR_DEVIATION,
            max_contrast: DEFAULT_MAX_CONTRAST,
            min_color_diff: None,
        }
    }
}

impl FilterParams {
    /// Parameters that keep every decodable, unique tile
    pub const fn accept_all() -> Self {
        Self {
            max_color_deviation: MAX_CHANNEL_DISTANCE,
            max_contrast: MAX_CHANNEL_DISTANCE,
            min_color_diff: None,
        }
    }

    /// Whether neither quality gate can reject anything
    pub const fn is_permissive(&self) -> bool {
        self.max_color_deviation >= MAX_CHANNEL_DISTANCE
            && self.max_contrast >= MAX_CHANNEL_DISTANCE
            && self.min_color_diff.is_none()
    }

    /// Check that both ceilings lie within `[0, 765]`
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the out-of-range gate
    pub fn validate(&self) -> Result<()> {
        if self.max_color_deviation > MAX_CHANNEL_DISTANCE {
            return Err(invalid_parameter(
                "max_color_deviation",
                &self.max_color_deviation,
                &"must be within 0..=765",
            ));
        }
        if self.max_contrast > MAX_CHANNEL_DISTANCE {
            return Err(invalid_parameter(
                "max_contrast",
                &self.max_contrast,
                &"must be within 0..=765",
            ));
        }
        if let Some(diff) = self.min_color_diff
            && diff > MAX_CHANNEL_DISTANCE
        {
            return Err(invalid_parameter(
                "min_color_diff",
                &diff,
                &"must be within 0..=765",
            ));
        }
        Ok(())
    }
}

/// Everything that determines the contents of a built tile library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LibraryParams {
    /// Quality gates
    pub filter: FilterParams,
    /// Square size every source image is normalized to before deduplication
    pub working_size: Option<u32>,
    /// Square size retained tiles are stored at
    pub storage_size: Option<u32>,
}

impl LibraryParams {
    /// Validate the filter and reject zero-sized normalization targets
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an out-of-range gate or a zero size
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()?;
        if self.working_size == Some(0) {
            return Err(invalid_parameter("working_size", &0, &"must be positive"));
        }
        if self.storage_size == Some(0) {
            return Err(invalid_parameter("storage_size", &0, &"must be positive"));
        }
        Ok(())
    }
}

/// Zoom sequence generation controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSettings {
    /// First zoom factor, strictly greater than 1
    pub start: f64,
    /// Multiplicative increment, strictly greater than 1
    pub increment: f64,
    /// Stop once the crop window's shorter side spans this many tiles or fewer
    pub min_tile_span: u32,
    /// Cap on the number of frames
    pub max_images: Option<usize>,
    /// Width of the box frames are fitted into
    pub display_width: u32,
    /// Height of the box frames are fitted into
    pub display_height: u32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            start: DEFAULT_ZOOM_START,
            increment: DEFAULT_ZOOM_INCREMENT,
            min_tile_span: DEFAULT_MIN_TILE_SPAN,
            max_images: None,
            display_width: DEFAULT_DISPLAY_SIZE.0,
            display_height: DEFAULT_DISPLAY_SIZE.1,
        }
    }
}

impl ZoomSettings {
    /// Reject factors that would not terminate and degenerate display sizes
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending setting
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || self.start <= 1.0 {
            return Err(invalid_parameter(
                "zoom_start",
                &self.start,
                &"must be a finite factor greater than 1",
            ));
        }
        if !self.increment.is_finite() || self.increment <= 1.0 {
            return Err(invalid_parameter(
                "zoom_incr",
                &self.increment,
                &"must be a finite factor greater than 1",
            ));
        }
        if self.min_tile_span == 0 {
            return Err(invalid_parameter(
                "min_tile_span",
                &self.min_tile_span,
                &"must be at least one tile",
            ));
        }
        if self.display_width < 2 || self.display_height < 2 {
            return Err(invalid_parameter(
                "display_size",
                &format!("{}x{}", self.display_width, self.display_height),
                &"both sides must be at least 2 pixels",
            ));
        }
        Ok(())
    }
}

/// Independent output switches
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputToggles {
    /// Full-resolution mosaic
    pub fullres: bool,
    /// Overview at the target's dimensions
    pub lowres: bool,
    /// Zoom stills
    pub zooms: bool,
    /// Looping GIF of the zoom sequence
    pub gif: bool,
    /// Looping GIF of the reversed zoom sequence
    pub gif_reversed: bool,
    /// Numbered frame sequence for an external video muxer
    pub frames: bool,
    /// Numbered frame sequence, reversed
    pub frames_reversed: bool,
}

impl Default for OutputToggles {
    fn default() -> Self {
        Self {
            fullres: true,
            lowres: true,
            zooms: false,
            gif: false,
            gif_reversed: false,
            frames: false,
            frames_reversed: false,
        }
    }
}

impl OutputToggles {
    /// Whether any enabled output consumes the zoom sequence
    pub const fn needs_zoom_sequence(&self) -> bool {
        self.zooms || self.gif || self.gif_reversed || self.frames || self.frames_reversed
    }

    /// Whether at least one artifact will be written
    pub const fn any(&self) -> bool {
        self.fullres || self.lowres || self.needs_zoom_sequence()
    }
}

/// Optional target resize; a missing side is derived from the aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    /// Requested width
    pub width: Option<u32>,
    /// Requested height
    pub height: Option<u32>,
}

impl TargetSize {
    /// Resolve the requested size against the original `(width, height)`
    ///
    /// # Errors
    ///
    /// Returns a configuration error when both sides are missing, a side is
    /// zero, or the result would be larger than the original
    pub fn resolve(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        let describe = || format!("{:?}x{:?}", self.width, self.height);
        let (new_width, new_height) = match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (None, Some(h)) if h > 0 => {
                let w = (f64::from(width) / (f64::from(height) / f64::from(h))) as u32;
                (w, h)
            }
            (Some(w), None) if w > 0 => {
                let h = (f64::from(height) / (f64::from(width) / f64::from(w))) as u32;
                (w, h)
            }
            (None, None) => {
                return Err(invalid_parameter(
                    "target_size",
                    &describe(),
                    &"width or height must be specified",
                ));
            }
            _ => (0, 0),
        };

        if new_width == 0 || new_height == 0 {
            return Err(invalid_parameter(
                "target_size",
                &describe(),
                &"resolved size must be at least 1x1",
            ));
        }
        if new_width > width || new_height > height {
            return Err(invalid_parameter(
                "target_size",
                &describe(),
                &format!("larger than the original {width}x{height}"),
            ));
        }
        Ok((new_width, new_height))
    }
}

/// Where palette colors for constrained selection come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaletteSource {
    /// Extract the palette from the mosaic target itself
    #[default]
    Target,
    /// Extract the palette from another reference image
    Image(PathBuf),
    /// Evenly spaced, fully saturated hues
    HueWheel,
}

/// Complete configuration of a mosaic job
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicConfig {
    /// Folder of candidate tile images
    pub tiles_dir: PathBuf,
    /// Folder receiving every artifact
    pub output_dir: PathBuf,
    /// Folder holding the built library between runs
    pub cache_dir: Option<PathBuf>,
    /// Library curation parameters
    pub library: LibraryParams,
    /// Tile edge length in the mosaic (`images_size`)
    pub tile_size: u32,
    /// Palette-constrained tile count (`num_images`)
    pub num_images: Option<usize>,
    /// Palette origin for constrained selection
    pub palette_source: PaletteSource,
    /// Color distance shared by matching and palette selection
    pub metric: DistanceMetric,
    /// Lossy encoding quality, 1..=100
    pub quality: u8,
    /// Optional resize applied to the target before matching
    pub target_size: Option<TargetSize>,
    /// Zoom sequence controls
    pub zoom: ZoomSettings,
    /// Output switches
    pub outputs: OutputToggles,
    /// Extension of raster outputs
    pub output_extension: String,
}

impl MosaicConfig {
    /// Configuration with every option at its default
    pub fn new(tiles_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            tiles_dir: tiles_dir.into(),
            output_dir: output_dir.into(),
            cache_dir: None,
            library: LibraryParams::default(),
            tile_size: DEFAULT_TILE_SIZE,
            num_images: None,
            palette_source: PaletteSource::default(),
            metric: DistanceMetric::default(),
            quality: DEFAULT_QUALITY,
            target_size: None,
            zoom: ZoomSettings::default(),
            outputs: OutputToggles::default(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }

    /// Check every option before any work is done
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first invalid option
    pub fn validate(&self) -> Result<()> {
        self.library.validate()?;
        if self.tile_size == 0 {
            return Err(invalid_parameter(
                "images_size",
                &self.tile_size,
                &"tiles must be at least one pixel wide",
            ));
        }
        if self.num_images == Some(0) {
            return Err(invalid_parameter(
                "num_images",
                &0,
                &"a palette needs at least one color",
            ));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(invalid_parameter(
                "quality",
                &self.quality,
                &"must be within 1..=100",
            ));
        }
        if image::ImageFormat::from_extension(&self.output_extension).is_none() {
            return Err(invalid_parameter(
                "output_extension",
                &self.output_extension,
                &"not a supported raster format",
            ));
        }
        if self.outputs.needs_zoom_sequence() {
            self.zoom.validate()?;
        }
        Ok(())
    }
}
