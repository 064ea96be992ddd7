//! Tile library construction and caching
//!
//! This module contains:
//! - Byte-identical duplicate removal
//! - Library curation (normalize, deduplicate, filter, index)
//! - The on-disk cache keyed by source contents and parameters

/// Duplicate image removal
pub mod dedup;
/// On-disk library cache
pub mod store;
/// Tiles and the curated library
pub mod tiles;

pub use tiles::{Tile, TileId, TileLibrary};
