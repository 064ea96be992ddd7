//! Palette-constrained tile selection without repetition

use crate::algorithm::matcher::{DistanceMetric, nearest_without_replacement};
use crate::analysis::palette::PaletteExtractor;
use crate::analysis::signature::ColorSignature;
use crate::io::configuration::{MAX_PALETTE_TILES, MIN_PALETTE_TILES};
use crate::io::error::{Result, capacity_error};
use crate::io::image::PixelGrid;
use crate::library::TileLibrary;
use bitvec::vec::BitVec;
use log::debug;

/// Clamp a requested tile count to `[min(3, n), min(255, n)]`
pub fn clamp_tile_count(requested: usize, library_len: usize) -> usize {
    let lower = MIN_PALETTE_TILES.min(library_len);
    let upper = MAX_PALETTE_TILES.min(library_len);
    requested.clamp(lower, upper)
}

/// Number of colors to ask the extractor for when `count` tiles are wanted
///
/// | wanted      | requested |
/// |-------------|-----------|
/// | `k >= 7`    | `k + 1`   |
/// | `3 < k < 7` | `k`       |
/// | `k <= 3`    | `2`       |
pub const fn palette_request_size(count: usize) -> usize {
    if count >= 7 {
        count + 1
    } else if count > 3 {
        count
    } else {
        2
    }
}

/// Positions of the tiles matched to `palette`, pairwise distinct
///
/// Palette colors are visited in order, each taking its nearest unused tile.
/// When the palette is shorter than `count` it is visited again, so every
/// color keeps claiming its next-best tile until `count` tiles are chosen or
/// the candidates run out.
pub fn select_positions(
    signatures: &[ColorSignature],
    palette: &[ColorSignature],
    count: usize,
    metric: DistanceMetric,
) -> Vec<usize> {
    let mut excluded = BitVec::repeat(false, signatures.len());
    let mut picks = Vec::with_capacity(count.min(signatures.len()));

    for &color in palette.iter().cycle() {
        if picks.len() >= count {
            break;
        }
        match nearest_without_replacement(signatures, color, metric, &mut excluded) {
            Some(position) => picks.push(position),
            None => break,
        }
    }

    picks
}

/// Narrows a library to tiles representing a reference image's palette
pub struct PaletteSelector<'a, E: PaletteExtractor + ?Sized> {
    extractor: &'a E,
    metric: DistanceMetric,
}

impl<'a, E: PaletteExtractor + ?Sized> PaletteSelector<'a, E> {
    /// Selector drawing palettes from `extractor` and matching under `metric`
    pub const fn new(extractor: &'a E, metric: DistanceMetric) -> Self {
        Self { extractor, metric }
    }

    /// Pick `requested` (clamped) distinct tiles matching `reference`'s palette
    ///
    /// # Errors
    ///
    /// Returns a capacity error if the library is empty or the extractor
    /// finds no colors, and propagates extractor errors
    pub fn select(
        &self,
        library: &TileLibrary,
        reference: &PixelGrid,
        requested: usize,
    ) -> Result<TileLibrary> {
        if library.is_empty() {
            return Err(capacity_error("library tiles", requested, 0));
        }

        let count = clamp_tile_count(requested, library.len());
        let request = if self.extractor.quantizes() {
            palette_request_size(count)
        } else {
            count
        };
        let mut palette = self.extractor.extract(reference, request)?;
        if palette.is_empty() {
            return Err(capacity_error("palette colors", count, 0));
        }
        palette.truncate(count);

        let positions = select_positions(&library.signatures(), &palette, count, self.metric);
        debug!(
            "Palette of {} colors selected {} of {} tiles",
            palette.len(),
            positions.len(),
            library.len()
        );

        Ok(library.subset(&positions))
    }
}
