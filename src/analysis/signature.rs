//! Representative color of a tile or target region

use crate::io::image::PixelGrid;
use crate::math::resample::mean_color;
use serde::{Deserialize, Serialize};

/// Single RGB triple summarizing a pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ColorSignature(pub [u8; 3]);

impl ColorSignature {
    /// Signature from raw channel values
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Area-averaged color of `grid`
    ///
    /// Equivalent to an area-averaging resize down to a single pixel: the true
    /// per-channel mean, rounded half up.
    pub fn average(grid: &PixelGrid) -> Self {
        Self(mean_color(grid))
    }

    /// Channel values as `[r, g, b]`
    pub const fn channels(&self) -> [u8; 3] {
        self.0
    }

    /// Summed absolute channel difference, in `[0, 765]`
    pub fn manhattan(&self, other: &Self) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| u32::from(a.abs_diff(b)))
            .sum()
    }

    /// Squared Euclidean distance over the three channels
    pub fn squared_euclidean(&self, other: &Self) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| {
                let d = u32::from(a.abs_diff(b));
                d * d
            })
            .sum()
    }
}

impl From<image::Rgb<u8>> for ColorSignature {
    fn from(pixel: image::Rgb<u8>) -> Self {
        Self(pixel.0)
    }
}

impl From<[u8; 3]> for ColorSignature {
    fn from(channels: [u8; 3]) -> Self {
        Self(channels)
    }
}
