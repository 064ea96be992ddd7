//! Area-averaging resampling
//!
//! Every output pixel is the coverage-weighted mean of the source pixels its
//! footprint overlaps. Shrinking to 1x1 therefore yields the exact
//! per-channel mean, which the color signatures rely on.

use crate::io::image::PixelGrid;
use image::ImageBuffer;
use rayon::prelude::*;

/// Source pixels contributing to one output coordinate along an axis
#[derive(Debug, Clone)]
struct Span {
    taps: Vec<(usize, f64)>,
    total: f64,
}

// Footprints narrower than this are floating point noise at interval edges
const MIN_COVERAGE: f64 = 1e-12;

fn axis_spans(src: u32, dst: u32) -> Vec<Span> {
    let scale = f64::from(src) / f64::from(dst);
    let src_len = src as usize;

    (0..dst)
        .map(|o| {
            let start = f64::from(o) * scale;
            let end = (start + scale).min(f64::from(src));
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);

            let mut taps: Vec<(usize, f64)> = (first..last)
                .filter_map(|i| {
                    let lo = start.max(i as f64);
                    let hi = end.min(i as f64 + 1.0);
                    let weight = hi - lo;
                    (weight > MIN_COVERAGE).then_some((i, weight))
                })
                .collect();

            if taps.is_empty() {
                taps.push((first.min(src_len.saturating_sub(1)), 1.0));
            }
            let total = taps.iter().map(|&(_, w)| w).sum();
            Span { taps, total }
        })
        .collect()
}

fn to_channel(value: f64) -> u8 {
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Rectangle of a grid, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Region {
    /// The whole of a `width × height` grid
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Centered `width × height` window of a `grid_width × grid_height` grid
    ///
    /// Sides are clamped to `[1, grid side]`.
    pub fn centered(grid_width: u32, grid_height: u32, width: u32, height: u32) -> Self {
        let width = width.clamp(1, grid_width.max(1));
        let height = height.clamp(1, grid_height.max(1));
        Self {
            x: grid_width.saturating_sub(width) / 2,
            y: grid_height.saturating_sub(height) / 2,
            width,
            height,
        }
    }

    /// Intersection with a `grid_width × grid_height` grid
    fn clipped(self, grid_width: u32, grid_height: u32) -> Self {
        let x = self.x.min(grid_width);
        let y = self.y.min(grid_height);
        Self {
            x,
            y,
            width: self.width.min(grid_width - x),
            height: self.height.min(grid_height - y),
        }
    }
}

/// Resize with area-averaging (box) resampling
///
/// Zero-sized requests and empty sources yield a black grid of the requested
/// size.
pub fn resize_area(grid: &PixelGrid, width: u32, height: u32) -> PixelGrid {
    if grid.dimensions() == (width, height) {
        return grid.clone();
    }
    resize_area_region(grid, Region::full(grid.width(), grid.height()), width, height)
}

/// Area-averaging resize of `region` of `grid`, read in place
///
/// Output rows are produced in parallel, each accumulating the source rows
/// it covers, so memory stays proportional to the output. The region is
/// clipped to the grid; an empty region yields a black grid.
pub fn resize_area_region(grid: &PixelGrid, region: Region, width: u32, height: u32) -> PixelGrid {
    let region = region.clipped(grid.width(), grid.height());
    if width == 0 || height == 0 || region.width == 0 || region.height == 0 {
        return PixelGrid::new(width, height);
    }

    let x_spans = axis_spans(region.width, width);
    let y_spans = axis_spans(region.height, height);
    let src_row_len = grid.width() as usize * 3;
    let dst_row_len = width as usize * 3;
    let left = region.x as usize * 3;
    let top = region.y as usize;
    let raw = grid.as_raw();

    let rows: Vec<Vec<u8>> = y_spans
        .par_iter()
        .map(|y_span| {
            let mut acc = vec![0.0f64; dst_row_len];
            for &(y, y_weight) in &y_span.taps {
                let offset = (top + y) * src_row_len + left;
                let Some(row) = raw.get(offset..offset + region.width as usize * 3) else {
                    continue;
                };
                for (out, x_span) in acc.chunks_exact_mut(3).zip(&x_spans) {
                    let mut pixel = [0.0f64; 3];
                    for &(x, x_weight) in &x_span.taps {
                        if let Some(source) = row.get(x * 3..x * 3 + 3) {
                            for (p, &v) in pixel.iter_mut().zip(source) {
                                *p += x_weight * f64::from(v);
                            }
                        }
                    }
                    for (a, p) in out.iter_mut().zip(pixel) {
                        *a += y_weight * (p / x_span.total);
                    }
                }
            }
            acc.iter().map(|a| to_channel(a / y_span.total)).collect()
        })
        .collect();

    ImageBuffer::from_raw(width, height, rows.concat())
        .unwrap_or_else(|| PixelGrid::new(width, height))
}

/// Per-channel mean of a grid, rounded half up
///
/// Computed with exact integer sums; agrees with `resize_area(grid, 1, 1)`.
pub fn mean_color(grid: &PixelGrid) -> [u8; 3] {
    let count = u64::from(grid.width()) * u64::from(grid.height());
    if count == 0 {
        return [0, 0, 0];
    }

    let mut sums = [0u64; 3];
    for pixel in grid.pixels() {
        for (sum, &v) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += u64::from(v);
        }
    }

    sums.map(|sum| ((sum * 2 + count) / (count * 2)).min(255) as u8)
}

/// Center-crop `grid` to `width × height` (clamped to the grid's own size)
pub fn center_crop(grid: &PixelGrid, width: u32, height: u32) -> PixelGrid {
    let region = Region::centered(grid.width(), grid.height(), width, height);
    image::imageops::crop_imm(grid, region.x, region.y, region.width, region.height).to_image()
}
