//! Color analysis of tiles and reference images

/// Palette extraction from reference images
pub mod palette;
/// Color uniformity and edge contrast quality gates
pub mod quality;
/// Representative color of a pixel grid
pub mod signature;

pub use signature::ColorSignature;
