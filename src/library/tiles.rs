//! Tile library curation: normalize, deduplicate, filter, index

use crate::analysis::quality::QualityReport;
use crate::analysis::signature::ColorSignature;
use crate::io::configuration::LibraryParams;
use crate::io::error::{Result, capacity_error};
use crate::io::image::{ImageCodec, PixelGrid, list_images};
use crate::library::dedup::unique_indices;
use indicatif::ProgressBar;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Stable tile identifier: position of the source file in name order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A curated building block of the mosaic
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Stable identifier
    pub id: TileId,
    /// File the tile was decoded from
    pub source: PathBuf,
    /// Stored pixels
    pub pixels: PixelGrid,
    /// Area-averaged color of `pixels`
    pub signature: ColorSignature,
}

impl Tile {
    /// Build a tile and compute its signature
    pub fn new(id: TileId, source: PathBuf, pixels: PixelGrid) -> Self {
        let signature = ColorSignature::average(&pixels);
        Self {
            id,
            source,
            pixels,
            signature,
        }
    }
}

/// Ordered, deduplicated, quality-filtered set of tiles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileLibrary {
    tiles: Vec<Tile>,
    index: HashMap<TileId, usize>,
}

impl TileLibrary {
    /// Wrap already curated tiles, keeping their order
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        let index = tiles
            .iter()
            .enumerate()
            .map(|(position, tile)| (tile.id, position))
            .collect();
        Self { tiles, index }
    }

    /// Curate every image in `source` into a library
    ///
    /// Files are sorted by name and numbered, decoded (and normalized to the
    /// working size), deduplicated, passed through the quality gates, resized
    /// to the storage size and indexed by signature.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - a configuration error if `source` is missing, empty, or `params` is invalid
    /// - a decode error naming the first file that cannot be decoded
    /// - a capacity error if no tile survives the quality gates
    pub fn build<C: ImageCodec>(
        source: &Path,
        params: &LibraryParams,
        codec: &C,
        progress: Option<&ProgressBar>,
    ) -> Result<Self> {
        params.validate()?;
        let files = list_images(source)?;
        if let Some(bar) = progress {
            bar.set_length(files.len() as u64);
            bar.set_position(0);
        }

        let normalized: Vec<(PathBuf, PixelGrid)> = files
            .into_par_iter()
            .map(|path| -> Result<(PathBuf, PixelGrid)> {
                let mut pixels = codec.load(&path)?;
                if let Some(size) = params.working_size {
                    pixels = codec.resize(&pixels, size, size);
                }
                if let Some(bar) = progress {
                    bar.inc(1);
                }
                Ok((path, pixels))
            })
            .collect::<Result<Vec<_>>>()?;
        let decoded = normalized.len();

        let grids: Vec<&PixelGrid> = normalized.iter().map(|(_, pixels)| pixels).collect();
        let kept = unique_indices(&grids);
        let mut keep_mask = vec![false; normalized.len()];
        for index in kept {
            if let Some(slot) = keep_mask.get_mut(index) {
                *slot = true;
            }
        }

        let unique: Vec<(TileId, PathBuf, PixelGrid)> = normalized
            .into_iter()
            .enumerate()
            .zip(keep_mask)
            .filter_map(|((position, (path, pixels)), keep)| {
                keep.then_some((TileId(position), path, pixels))
            })
            .collect();
        let after_dedup = unique.len();
        debug!("{} duplicates removed", decoded - after_dedup);

        let filter = params.filter;
        let passing: Vec<(TileId, PathBuf, PixelGrid, ColorSignature)> = unique
            .into_par_iter()
            .filter_map(|(id, path, pixels)| {
                let signature = ColorSignature::average(&pixels);
                QualityReport::measure(&pixels, signature)
                    .passes(&filter)
                    .then_some((id, path, pixels, signature))
            })
            .collect();

        let accepted = match filter.min_color_diff {
            Some(min_diff) => keep_distinct_colors(passing, min_diff),
            None => passing,
        };

        let tiles: Vec<Tile> = accepted
            .into_par_iter()
            .map(|(id, path, pixels, _)| {
                let stored = match params.storage_size {
                    Some(size) => codec.resize(&pixels, size, size),
                    None => pixels,
                };
                Tile::new(id, path, stored)
            })
            .collect();

        info!(
            "Tile library from '{}': {decoded} decoded, {after_dedup} unique, {} retained",
            source.display(),
            tiles.len()
        );

        if tiles.is_empty() {
            return Err(capacity_error("tiles passing the quality gates", 1, 0));
        }

        Ok(Self::from_tiles(tiles))
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the library holds no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in library order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Look a tile up by id
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.index
            .get(&id)
            .and_then(|&position| self.tiles.get(position))
    }

    /// Signatures in library order
    pub fn signatures(&self) -> Vec<ColorSignature> {
        self.tiles.iter().map(|tile| tile.signature).collect()
    }

    /// Ids in library order
    pub fn ids(&self) -> Vec<TileId> {
        self.tiles.iter().map(|tile| tile.id).collect()
    }

    /// New library holding copies of the tiles at `positions`, in that order
    pub fn subset(&self, positions: &[usize]) -> Self {
        Self::from_tiles(
            positions
                .iter()
                .filter_map(|&position| self.tiles.get(position).cloned())
                .collect(),
        )
    }
}

// Sequential: acceptance of a tile depends on every tile accepted before it
fn keep_distinct_colors(
    candidates: Vec<(TileId, PathBuf, PixelGrid, ColorSignature)>,
    min_diff: u32,
) -> Vec<(TileId, PathBuf, PixelGrid, ColorSignature)> {
    let mut accepted: Vec<(TileId, PathBuf, PixelGrid, ColorSignature)> = Vec::new();
    for candidate in candidates {
        let too_close = accepted
            .iter()
            .any(|(_, _, _, signature)| signature.manhattan(&candidate.3) <= min_diff);
        if !too_close {
            accepted.push(candidate);
        }
    }
    accepted
}
