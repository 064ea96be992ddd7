//! Derivative artifacts of a finished mosaic

pub mod animation;
pub mod derivatives;
pub mod zoom;

pub use derivatives::{Artifact, ArtifactPaths, DerivativeRenderer};
