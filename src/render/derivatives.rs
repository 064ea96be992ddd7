//! Secondary artifacts derived from a finished mosaic

use crate::io::configuration::{
    LOWRES_SUFFIX, MOSAIC_SUFFIX, OutputToggles, REVERSED_SUFFIX, ZOOM_SUFFIX, ZoomSettings,
};
use crate::io::error::{MosaicError, Result};
use crate::io::image::{ImageCodec, PixelGrid, write_directory_atomically};
use crate::render::animation::{AnimationEncoder, AnimationOptions, FrameSequence, GifAnimation};
use crate::render::zoom::ZoomSequence;
use log::{debug, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// Artifacts rendered from the mosaic after it has been written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// Overview at the target's dimensions
    Lowres,
    /// Directory of zoom stills
    ZoomStills,
    /// Zoom-in GIF
    Gif,
    /// Zoom-out GIF
    GifReversed,
    /// Zoom-in frame sequence
    Frames,
    /// Zoom-out frame sequence
    FramesReversed,
}

impl Artifact {
    /// Every derivative, in rendering order
    pub const ALL: [Self; 6] = [
        Self::Lowres,
        Self::ZoomStills,
        Self::Gif,
        Self::GifReversed,
        Self::Frames,
        Self::FramesReversed,
    ];

    /// Whether `toggles` asks for this artifact
    pub const fn enabled(self, toggles: &OutputToggles) -> bool {
        match self {
            Self::Lowres => toggles.lowres,
            Self::ZoomStills => toggles.zooms,
            Self::Gif => toggles.gif,
            Self::GifReversed => toggles.gif_reversed,
            Self::Frames => toggles.frames,
            Self::FramesReversed => toggles.frames_reversed,
        }
    }

    /// Whether this artifact is built from the zoom sequence
    pub const fn uses_zoom(self) -> bool {
        !matches!(self, Self::Lowres)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lowres => "lowres overview",
            Self::ZoomStills => "zoom stills",
            Self::Gif => "zoom GIF",
            Self::GifReversed => "reversed zoom GIF",
            Self::Frames => "zoom frames",
            Self::FramesReversed => "reversed zoom frames",
        };
        f.write_str(name)
    }
}

/// Output locations for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// `<stem>_mosaic.<ext>`
    pub fullres: PathBuf,
    /// `<stem>_lowres.<ext>`
    pub lowres: PathBuf,
    /// `<stem>_zoom/`
    pub zoom_stills: PathBuf,
    /// `<stem>_zoom.gif`
    pub gif: PathBuf,
    /// `<stem>_zoom_reversed.gif`
    pub gif_reversed: PathBuf,
    /// `<stem>_zoom_frames/`
    pub frames: PathBuf,
    /// `<stem>_zoom_frames_reversed/`
    pub frames_reversed: PathBuf,
}

impl ArtifactPaths {
    /// Paths under `output_dir` for the target named `stem`
    pub fn for_target(output_dir: &Path, stem: &str, extension: &str) -> Self {
        let file = |name: String| output_dir.join(name);
        Self {
            fullres: file(format!("{stem}{MOSAIC_SUFFIX}.{extension}")),
            lowres: file(format!("{stem}{LOWRES_SUFFIX}.{extension}")),
            zoom_stills: file(format!("{stem}{ZOOM_SUFFIX}")),
            gif: file(format!("{stem}{ZOOM_SUFFIX}.gif")),
            gif_reversed: file(format!("{stem}{ZOOM_SUFFIX}{REVERSED_SUFFIX}.gif")),
            frames: file(format!("{stem}{ZOOM_SUFFIX}_frames")),
            frames_reversed: file(format!("{stem}{ZOOM_SUFFIX}_frames{REVERSED_SUFFIX}")),
        }
    }

    /// Whether `path` is a file some target's outputs would be named like
    ///
    /// Covers the mosaic, the overview and both GIFs, whatever the raster
    /// extension. Still and frame directories are not files.
    pub fn is_artifact_file(path: &Path) -> bool {
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            return false;
        };
        let is_gif = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("gif"));
        let zoom_reversed = format!("{ZOOM_SUFFIX}{REVERSED_SUFFIX}");

        stem.ends_with(MOSAIC_SUFFIX)
            || stem.ends_with(LOWRES_SUFFIX)
            || (is_gif && (stem.ends_with(ZOOM_SUFFIX) || stem.ends_with(&zoom_reversed)))
    }

    /// Location of `artifact`
    pub fn get(&self, artifact: Artifact) -> &Path {
        match artifact {
            Artifact::Lowres => &self.lowres,
            Artifact::ZoomStills => &self.zoom_stills,
            Artifact::Gif => &self.gif,
            Artifact::GifReversed => &self.gif_reversed,
            Artifact::Frames => &self.frames,
            Artifact::FramesReversed => &self.frames_reversed,
        }
    }
}

/// Outcome of rendering the derivatives of one mosaic
#[derive(Debug, Default)]
pub struct DerivativeReport {
    /// Artifacts written, with their locations
    pub written: Vec<(Artifact, PathBuf)>,
    /// Artifacts an encoder rejected
    pub failed: Vec<(Artifact, MosaicError)>,
    /// Enabled zoom artifacts left out because no zoom frame fits the mosaic
    pub skipped: Vec<Artifact>,
}

impl DerivativeReport {
    /// Whether every enabled artifact was written
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Renders the lowres overview and zoom-based artifacts of a mosaic
pub struct DerivativeRenderer<'a, C: ImageCodec> {
    codec: &'a C,
    tile_size: u32,
    zoom: ZoomSettings,
    extension: String,
    animation: AnimationOptions,
}

impl<'a, C: ImageCodec> DerivativeRenderer<'a, C> {
    /// Renderer for a mosaic of `tile_size` tiles, writing `extension` stills
    pub fn new(codec: &'a C, tile_size: u32, zoom: ZoomSettings, extension: impl Into<String>) -> Self {
        Self {
            codec,
            tile_size,
            zoom,
            extension: extension.into(),
            animation: AnimationOptions::default(),
        }
    }

    /// Use `options` for every animation
    #[must_use]
    pub const fn with_animation(mut self, options: AnimationOptions) -> Self {
        self.animation = options;
        self
    }

    /// Area-averaged overview of `mosaic` at `width × height`
    pub fn lowres(&self, mosaic: &PixelGrid, width: u32, height: u32) -> PixelGrid {
        self.codec.resize(mosaic, width, height)
    }

    /// Centered zoom sequence into `mosaic`
    pub fn zoom_sequence(&self, mosaic: &PixelGrid) -> ZoomSequence {
        ZoomSequence::render(mosaic, self.tile_size, &self.zoom, self.codec)
    }

    /// Write every zoom frame into `dir` as `zoom_000.<ext>` upwards
    ///
    /// # Errors
    ///
    /// Returns an encode or file system error; the directory only appears
    /// once every still is written
    pub fn write_zoom_stills(&self, sequence: &ZoomSequence, dir: &Path) -> Result<()> {
        write_directory_atomically(dir, |staging| {
            for (index, frame) in sequence.frames().iter().enumerate() {
                let name = format!("zoom_{index:03}.{}", self.extension);
                self.codec.save(frame, &staging.join(name))?;
            }
            Ok(())
        })
    }

    /// Render and write every enabled derivative of `mosaic`
    ///
    /// `target_size` is the `(width, height)` of the target the mosaic was
    /// built from. A rejected encoding only loses its own artifact; it is
    /// logged and recorded in the report.
    ///
    /// # Errors
    ///
    /// Returns any error other than an encoder rejection
    pub fn write_all(
        &self,
        mosaic: &PixelGrid,
        target_size: (u32, u32),
        toggles: &OutputToggles,
        paths: &ArtifactPaths,
    ) -> Result<DerivativeReport> {
        let mut report = DerivativeReport::default();
        let sequence = toggles
            .needs_zoom_sequence()
            .then(|| self.zoom_sequence(mosaic));
        if let Some(sequence) = &sequence {
            debug!(
                "Zoom sequence of {} frames at {}x{}",
                sequence.len(),
                sequence.frame_size().0,
                sequence.frame_size().1
            );
        }

        for artifact in Artifact::ALL {
            if !artifact.enabled(toggles) {
                continue;
            }
            let path = paths.get(artifact);

            let outcome = match (&sequence, artifact) {
                (_, Artifact::Lowres) => {
                    let overview = self.lowres(mosaic, target_size.0, target_size.1);
                    self.codec.save(&overview, path)
                }
                (Some(sequence), _) if sequence.is_empty() => {
                    warn!("No zoom frame fits the mosaic, skipping {artifact}");
                    report.skipped.push(artifact);
                    continue;
                }
                (Some(sequence), _) => self.write_zoom_artifact(sequence, artifact, path),
                (None, _) => continue,
            };

            match outcome {
                Ok(()) => report.written.push((artifact, path.to_path_buf())),
                Err(error) if error.is_encode() => {
                    warn!("Could not write {artifact}: {error}");
                    report.failed.push((artifact, error));
                }
                Err(error) => return Err(error),
            }
        }

        Ok(report)
    }

    fn write_zoom_artifact(&self, sequence: &ZoomSequence, artifact: Artifact, path: &Path) -> Result<()> {
        let frames = FrameSequence::new(self.codec, self.extension.clone());
        match artifact {
            Artifact::ZoomStills => self.write_zoom_stills(sequence, path),
            Artifact::Gif => GifAnimation.encode(&sequence.ordered(false), path, &self.animation),
            Artifact::GifReversed => GifAnimation.encode(&sequence.ordered(true), path, &self.animation),
            Artifact::Frames => frames.encode(&sequence.ordered(false), path, &self.animation),
            Artifact::FramesReversed => frames.encode(&sequence.ordered(true), path, &self.animation),
            Artifact::Lowres => Ok(()),
        }
    }
}
