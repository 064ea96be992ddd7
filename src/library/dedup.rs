//! Byte-identical image removal
//!
//! Images are bucketed by a content hash computed in parallel, then compared
//! byte for byte within a bucket in sort order. The earliest copy survives,
//! which is the same set the naive pairwise comparison would keep.

use crate::io::image::PixelGrid;
use rayon::prelude::*;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

fn content_hash(grid: &PixelGrid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.dimensions().hash(&mut hasher);
    grid.as_raw().hash(&mut hasher);
    hasher.finish()
}

fn identical(a: &PixelGrid, b: &PixelGrid) -> bool {
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}

/// Indices of the grids to keep, ascending
///
/// A grid is dropped when an earlier kept grid has identical dimensions and
/// bytes. Applying this to its own output removes nothing.
pub fn unique_indices(grids: &[&PixelGrid]) -> Vec<usize> {
    let hashes: Vec<u64> = grids.par_iter().map(|grid| content_hash(grid)).collect();

    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut kept = Vec::with_capacity(grids.len());

    for (index, (grid, hash)) in grids.iter().zip(hashes).enumerate() {
        let bucket = buckets.entry(hash).or_default();
        let duplicate = bucket
            .iter()
            .filter_map(|&earlier| grids.get(earlier))
            .any(|earlier| identical(earlier, grid));

        if !duplicate {
            bucket.push(index);
            kept.push(index);
        }
    }

    kept
}
