//! Numeric utilities shared by the pipeline stages

/// Area-averaging resize, exact means and centered crops
pub mod resample;
