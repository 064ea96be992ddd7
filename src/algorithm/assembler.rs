//! Per-pixel tile assignment and composition of the full-resolution mosaic
//!
//! Both phases are embarrassingly parallel: each target row is matched by its
//! own worker with its own lookup cache, and each output strip of tile rows
//! is written by exactly one worker.

use crate::algorithm::cache::{CacheStats, MatchCache};
use crate::algorithm::matcher::{DistanceMetric, Matcher};
use crate::analysis::signature::ColorSignature;
use crate::io::configuration::MAX_MOSAIC_PIXELS;
use crate::io::error::{MosaicError, Result, capacity_error, invalid_parameter};
use crate::io::image::{ImageCodec, PixelGrid};
use crate::library::{TileId, TileLibrary};
use image::ImageBuffer;
use indicatif::ProgressBar;
use log::debug;
use ndarray::Array2;
use rayon::prelude::*;

/// Target coordinate `(row, col)` to position in the [`TileSet`]
pub type Assignment = Array2<usize>;

/// Tiles rendered at the mosaic's tile size, with their signatures
#[derive(Debug, Clone, PartialEq)]
pub struct TileSet {
    ids: Vec<TileId>,
    signatures: Vec<ColorSignature>,
    blocks: Vec<PixelGrid>,
    tile_size: u32,
}

impl TileSet {
    /// Render every library tile at `tile_size × tile_size`
    ///
    /// Signatures are taken from the library, not recomputed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero tile size and a capacity
    /// error for an empty library
    pub fn prepare<C: ImageCodec>(library: &TileLibrary, tile_size: u32, codec: &C) -> Result<Self> {
        if tile_size == 0 {
            return Err(invalid_parameter(
                "images_size",
                &tile_size,
                &"tiles must be at least one pixel wide",
            ));
        }
        if library.is_empty() {
            return Err(capacity_error("library tiles", 1, 0));
        }

        let blocks = library
            .tiles()
            .par_iter()
            .map(|tile| {
                if tile.pixels.dimensions() == (tile_size, tile_size) {
                    tile.pixels.clone()
                } else {
                    codec.resize(&tile.pixels, tile_size, tile_size)
                }
            })
            .collect();

        Ok(Self {
            ids: library.ids(),
            signatures: library.signatures(),
            blocks,
            tile_size,
        })
    }

    /// Edge length of every block
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Tile ids in set order
    pub fn ids(&self) -> &[TileId] {
        &self.ids
    }

    /// Signatures in set order
    pub fn signatures(&self) -> &[ColorSignature] {
        &self.signatures
    }

    /// Rendered block at `position`
    pub fn block(&self, position: usize) -> Option<&PixelGrid> {
        self.blocks.get(position)
    }
}

/// Output dimensions of a mosaic of `width × height` target pixels
///
/// # Errors
///
/// Returns a capacity error if the composite would exceed the pixel ceiling
/// or overflow the raster dimensions
pub fn mosaic_dimensions(width: u32, height: u32, tile_size: u32) -> Result<(u32, u32)> {
    let out_width = width.checked_mul(tile_size);
    let out_height = height.checked_mul(tile_size);
    let requested = u64::from(width) * u64::from(height) * u64::from(tile_size).pow(2);

    match (out_width, out_height) {
        (Some(w), Some(h)) if requested <= MAX_MOSAIC_PIXELS => Ok((w, h)),
        _ => Err(MosaicError::Capacity {
            resource: "mosaic pixels",
            requested,
            available: MAX_MOSAIC_PIXELS,
        }),
    }
}

/// Builds the composite by replacing each target pixel with its nearest tile
pub struct MosaicAssembler<'a> {
    tiles: &'a TileSet,
    matcher: Matcher,
}

impl<'a> MosaicAssembler<'a> {
    /// Assembler over `tiles`, matching under `metric`
    pub fn new(tiles: &'a TileSet, metric: DistanceMetric) -> Self {
        Self {
            tiles,
            matcher: Matcher::new(tiles.signatures.clone(), metric),
        }
    }

    /// Choose a tile for every target pixel
    pub fn assign(&self, target: &PixelGrid, progress: Option<&ProgressBar>) -> (Assignment, CacheStats) {
        let (width, height) = target.dimensions();
        if let Some(bar) = progress {
            bar.set_length(u64::from(height));
            bar.set_position(0);
        }

        let rows: Vec<(Vec<usize>, CacheStats)> = (0..height)
            .into_par_iter()
            .map(|y| {
                let mut cache = MatchCache::new();
                let row = (0..width)
                    .map(|x| {
                        let color = ColorSignature::from(*target.get_pixel(x, y));
                        self.matcher.nearest_cached(color, &mut cache).unwrap_or(0)
                    })
                    .collect();
                if let Some(bar) = progress {
                    bar.inc(1);
                }
                (row, cache.stats)
            })
            .collect();

        let mut assignment = Assignment::zeros((height as usize, width as usize));
        let mut stats = CacheStats::default();
        for (mut dst, (src, row_stats)) in assignment.outer_iter_mut().zip(rows) {
            for (cell, index) in dst.iter_mut().zip(src) {
                *cell = index;
            }
            stats += row_stats;
        }

        (assignment, stats)
    }

    /// Materialize `assignment` as a `(rows·S) × (cols·S)` grid
    ///
    /// # Errors
    ///
    /// Returns a capacity error if the composite exceeds the pixel ceiling
    pub fn compose(&self, assignment: &Assignment) -> Result<PixelGrid> {
        let (rows, cols) = assignment.dim();
        let tile_size = self.tiles.tile_size;
        let (out_width, out_height) = mosaic_dimensions(cols as u32, rows as u32, tile_size)?;

        let tile_row_len = tile_size as usize * 3;
        let out_row_len = out_width as usize * 3;
        let strip_len = out_row_len * tile_size as usize;
        let mut buffer = vec![0u8; strip_len * rows];

        if strip_len > 0 {
            buffer
                .par_chunks_mut(strip_len)
                .enumerate()
                .for_each(|(row_index, strip)| {
                    let row = assignment.row(row_index);
                    for (y, out_row) in strip.chunks_exact_mut(out_row_len).enumerate() {
                        let line = y * tile_row_len..(y + 1) * tile_row_len;
                        for (slot, &position) in out_row.chunks_exact_mut(tile_row_len).zip(row.iter()) {
                            if let Some(source) = self
                                .tiles
                                .blocks
                                .get(position)
                                .and_then(|block| block.as_raw().get(line.clone()))
                            {
                                slot.copy_from_slice(source);
                            }
                        }
                    }
                });
        }

        Ok(ImageBuffer::from_raw(out_width, out_height, buffer)
            .unwrap_or_else(|| PixelGrid::new(out_width, out_height)))
    }

    /// Assign and compose in one step
    ///
    /// # Errors
    ///
    /// Returns a capacity error if the composite exceeds the pixel ceiling
    pub fn assemble(&self, target: &PixelGrid, progress: Option<&ProgressBar>) -> Result<PixelGrid> {
        let (width, height) = target.dimensions();
        mosaic_dimensions(width, height, self.tiles.tile_size)?;

        let (assignment, stats) = self.assign(target, progress);
        debug!(
            "Matched {} pixels, cache hit rate {:.1}%",
            assignment.len(),
            stats.hit_rate() * 100.0
        );
        self.compose(&assignment)
    }
}
