/// Mosaic composition from a per-pixel tile assignment
pub mod assembler;
/// Memoization of nearest-tile lookups
pub mod cache;
/// Per-target job orchestration
pub mod executor;
/// Nearest-color search with and without replacement
pub mod matcher;
/// Palette-constrained tile selection
pub mod selection;
