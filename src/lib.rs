//! Photomosaic synthesis: a target image rebuilt as a grid of small tile images
//!
//! Tiles are curated from a folder of photos, reduced to one representative
//! color each, and matched against every pixel of the target. The composed
//! mosaic is then rendered into an overview, zoom stills and animations.

#![forbid(unsafe_code)]

/// Tile matching, palette selection, assembly and job orchestration
pub mod algorithm;
/// Color signatures, quality gates and palette extraction
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Tile library curation and caching
pub mod library;
/// Resampling utilities
pub mod math;
/// Lowres, zoom and animation derivatives
pub mod render;

pub use io::error::{MosaicError, Result};
