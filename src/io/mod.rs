//! Filesystem boundary, configuration and user interface

/// Command-line interface and batch processing
pub mod cli;
/// Pipeline constants and the job configuration record
pub mod configuration;
/// Error types shared by every stage
pub mod error;
/// Raster codec and atomic output writes
pub mod image;
/// Terminal progress display
pub mod progress;
