//! Progressive centered zoom into the mosaic
//!
//! The zoom factor grows geometrically from `start` by `increment`, so the
//! crop window shrinks geometrically and the sequence always ends. The stop
//! condition is expressed in tiles, which keeps the sequence length stable
//! across tile sizes.

use crate::io::configuration::ZoomSettings;
use crate::io::image::{ImageCodec, PixelGrid};
use crate::math::resample::Region;
use rayon::prelude::*;

/// One centered crop of the mosaic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    /// Zoom factor relative to the full mosaic
    pub zoom: f64,
    /// Crop width in mosaic pixels
    pub width: u32,
    /// Crop height in mosaic pixels
    pub height: u32,
}

/// Largest even-sided size with the aspect ratio of `width × height` inside the box
///
/// Both sides are at least 2, since video encoders reject odd or empty frames.
pub fn even_fit(width: u32, height: u32, box_width: u32, box_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (2, 2);
    }
    let scale = (f64::from(box_width) / f64::from(width)).min(f64::from(box_height) / f64::from(height));
    let even = |side: u32| {
        let scaled = (f64::from(side) * scale).floor() as u32;
        (scaled & !1).max(2)
    };
    (even(width), even(height))
}

/// Crop windows of the zoom sequence, zoom ascending
///
/// Stops before the window's shorter side drops to `tile_size × min_tile_span`
/// pixels, or once `max_images` windows exist. Invalid factors (not finite or
/// not above 1) yield an empty plan.
pub fn plan_zoom(full_width: u32, full_height: u32, tile_size: u32, settings: &ZoomSettings) -> Vec<CropWindow> {
    let valid = |factor: f64| factor.is_finite() && factor > 1.0;
    if !valid(settings.start) || !valid(settings.increment) {
        return Vec::new();
    }

    let threshold = (f64::from(tile_size) * f64::from(settings.min_tile_span)).max(1.0);
    let limit = settings.max_images.unwrap_or(usize::MAX);
    let mut windows = Vec::new();
    let mut zoom = settings.start;

    while windows.len() < limit {
        let width = f64::from(full_width) / zoom;
        let height = f64::from(full_height) / zoom;
        if width.min(height) <= threshold {
            break;
        }

        windows.push(CropWindow {
            zoom,
            width: (width.round() as u32).clamp(1, full_width.max(1)),
            height: (height.round() as u32).clamp(1, full_height.max(1)),
        });
        zoom *= settings.increment;
    }

    windows
}

/// Rendered zoom frames, all of one even display size
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomSequence {
    windows: Vec<CropWindow>,
    frames: Vec<PixelGrid>,
    frame_size: (u32, u32),
}

impl ZoomSequence {
    /// Crop and resize every planned window of `mosaic`
    pub fn render<C: ImageCodec>(
        mosaic: &PixelGrid,
        tile_size: u32,
        settings: &ZoomSettings,
        codec: &C,
    ) -> Self {
        let (full_width, full_height) = mosaic.dimensions();
        let windows = plan_zoom(full_width, full_height, tile_size, settings);
        let frame_size = even_fit(
            full_width,
            full_height,
            settings.display_width,
            settings.display_height,
        );

        let frames = windows
            .par_iter()
            .map(|window| {
                let region = Region::centered(full_width, full_height, window.width, window.height);
                codec.resize_region(mosaic, region, frame_size.0, frame_size.1)
            })
            .collect();

        Self {
            windows,
            frames,
            frame_size,
        }
    }

    /// Planned windows, zoom ascending
    pub fn windows(&self) -> &[CropWindow] {
        &self.windows
    }

    /// Frames, zoom ascending
    pub fn frames(&self) -> &[PixelGrid] {
        &self.frames
    }

    /// Frame references in the requested direction
    pub fn ordered(&self, reversed: bool) -> Vec<&PixelGrid> {
        if reversed {
            self.frames.iter().rev().collect()
        } else {
            self.frames.iter().collect()
        }
    }

    /// Shared `(width, height)` of every frame
    pub const fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no window was large enough to render
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
