//! Tile quality gates: color uniformity and edge contrast
//!
//! Good mosaic building blocks are close to a single color and have no strong
//! directional gradient, since both read as noise once a tile is repeated.

use crate::analysis::signature::ColorSignature;
use crate::io::configuration::{CONTRAST_TEST_SIZES, DEVIATION_TEST_SIZE, FilterParams};
use crate::io::image::PixelGrid;
use crate::math::resample::resize_area;

/// Measured quality of one tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    /// Mean summed channel distance of the sampled pixels from the signature
    pub color_deviation: f64,
    /// Largest edge-to-edge contrast across the sampled scales
    pub contrast: f64,
}

impl QualityReport {
    /// Measure `grid` against its own signature
    pub fn measure(grid: &PixelGrid, signature: ColorSignature) -> Self {
        Self {
            color_deviation: color_deviation(grid, signature),
            contrast: CONTRAST_TEST_SIZES
                .iter()
                .map(|&size| edge_contrast(grid, size).into_iter().fold(0.0, f64::max))
                .fold(0.0, f64::max),
        }
    }

    /// Whether both gates accept this tile
    pub fn passes(&self, filter: &FilterParams) -> bool {
        self.color_deviation <= f64::from(filter.max_color_deviation)
            && self.contrast <= f64::from(filter.max_contrast)
    }
}

/// Mean distance of a 10x10 sample from `signature`, in `[0, 765]`
pub fn color_deviation(grid: &PixelGrid, signature: ColorSignature) -> f64 {
    let sample = resize_area(grid, DEVIATION_TEST_SIZE, DEVIATION_TEST_SIZE);
    let count = sample.pixels().len();
    if count == 0 {
        return 0.0;
    }

    let total: u64 = sample
        .pixels()
        .map(|pixel| u64::from(ColorSignature::from(*pixel).manhattan(&signature)))
        .sum();
    total as f64 / count as f64
}

/// Left/right and top/bottom contrast of `grid` resized to `size × size`
///
/// Each value is the summed absolute channel difference between the averages
/// of the two opposite edge lines.
pub fn edge_contrast(grid: &PixelGrid, size: u32) -> [f64; 2] {
    let sample = resize_area(grid, size, size);
    let last = size.saturating_sub(1);

    let column = |x: u32| line_average((0..size).map(|y| sample.get_pixel(x, y)));
    let row = |y: u32| line_average((0..size).map(|x| sample.get_pixel(x, y)));

    [
        channel_distance(column(0), column(last)),
        channel_distance(row(0), row(last)),
    ]
}

fn line_average<'a>(pixels: impl Iterator<Item = &'a image::Rgb<u8>>) -> [f64; 3] {
    let mut sums = [0.0f64; 3];
    let mut count = 0usize;
    for pixel in pixels {
        for (sum, &v) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += f64::from(v);
        }
        count += 1;
    }
    if count == 0 {
        return sums;
    }
    sums.map(|sum| sum / count as f64)
}

fn channel_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}
