//! Palette extraction for palette-constrained tile selection

use crate::analysis::signature::ColorSignature;
use crate::io::configuration::{
    PALETTE_SAMPLE_STRIDE, PALETTE_SIGNIFICANT_BITS, PALETTE_WHITE_THRESHOLD,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::PixelGrid;
use std::collections::HashMap;

/// Produces an ordered set of representative colors for an image
pub trait PaletteExtractor: Sync {
    /// Extract up to `count` colors, most representative first
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `count` is zero
    fn extract(&self, image: &PixelGrid, count: usize) -> Result<Vec<ColorSignature>>;

    /// Whether colors are quantized from the image's content
    ///
    /// Quantized palettes are over-requested and trimmed by the selector;
    /// synthetic ones are asked for exactly the wanted size.
    fn quantizes(&self) -> bool {
        true
    }
}

fn reject_empty_request(count: usize) -> Result<()> {
    if count == 0 {
        return Err(invalid_parameter(
            "palette_size",
            &count,
            &"a palette needs at least one color",
        ));
    }
    Ok(())
}

/// Median-cut quantizer over a 5-bit-per-channel histogram
///
/// Boxes are split by population until three quarters of the requested
/// colors exist, then by population × volume so that large sparse regions of
/// the color cube still get represented. Near-white pixels are skipped unless
/// the image has nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedianCut {
    sample_stride: usize,
}

impl Default for MedianCut {
    fn default() -> Self {
        Self::new(PALETTE_SAMPLE_STRIDE)
    }
}

type BucketKey = [u8; 3];

#[derive(Debug, Clone)]
struct ColorBox {
    entries: Vec<(BucketKey, u64)>,
}

impl ColorBox {
    fn population(&self) -> u64 {
        self.entries.iter().map(|&(_, count)| count).sum()
    }

    fn ranges(&self) -> [u8; 3] {
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        for (key, _) in &self.entries {
            for axis in 0..3 {
                if let (Some(lo), Some(hi), Some(&v)) =
                    (min.get_mut(axis), max.get_mut(axis), key.get(axis))
                {
                    *lo = (*lo).min(v);
                    *hi = (*hi).max(v);
                }
            }
        }
        [0, 1, 2].map(|axis| {
            max.get(axis)
                .zip(min.get(axis))
                .map_or(0, |(hi, lo)| hi.saturating_sub(*lo))
        })
    }

    fn volume(&self) -> u64 {
        self.ranges().iter().map(|&r| u64::from(r) + 1).product()
    }

    fn can_split(&self) -> bool {
        self.entries.len() > 1
    }

    fn split(mut self) -> (Self, Self) {
        let ranges = self.ranges();
        let axis = (0..3)
            .max_by_key(|&axis| (ranges.get(axis).copied().unwrap_or(0), 3 - axis))
            .unwrap_or(0);

        self.entries.sort_unstable_by_key(|(key, _)| {
            (key.get(axis).copied().unwrap_or(0), *key)
        });

        let half = self.population() / 2;
        let mut accumulated = 0u64;
        let mut split_index = 1;
        for (i, (_, count)) in self.entries.iter().enumerate() {
            accumulated += count;
            if accumulated >= half && i + 1 < self.entries.len() {
                split_index = i + 1;
                break;
            }
        }
        split_index = split_index.clamp(1, self.entries.len() - 1);

        let right = self.entries.split_off(split_index);
        (Self { entries: self.entries }, Self { entries: right })
    }

    fn average(&self) -> ColorSignature {
        let shift = 8 - PALETTE_SIGNIFICANT_BITS;
        let half_bucket = 1u64 << shift >> 1;
        let population = self.population().max(1);

        let mut sums = [0u64; 3];
        for (key, count) in &self.entries {
            for (sum, &v) in sums.iter_mut().zip(key.iter()) {
                *sum += ((u64::from(v) << shift) + half_bucket) * count;
            }
        }
        ColorSignature(sums.map(|sum| ((sum * 2 + population) / (population * 2)).min(255) as u8))
    }
}

impl MedianCut {
    /// Quantizer sampling every `sample_stride`-th pixel (at least every pixel)
    pub fn new(sample_stride: usize) -> Self {
        Self {
            sample_stride: sample_stride.max(1),
        }
    }

    fn histogram(&self, image: &PixelGrid, skip_white: bool) -> Vec<(BucketKey, u64)> {
        let shift = 8 - PALETTE_SIGNIFICANT_BITS;
        let mut buckets: HashMap<BucketKey, u64> = HashMap::new();

        for pixel in image.pixels().step_by(self.sample_stride) {
            if skip_white && pixel.0.iter().all(|&v| v > PALETTE_WHITE_THRESHOLD) {
                continue;
            }
            *buckets.entry(pixel.0.map(|v| v >> shift)).or_insert(0) += 1;
        }

        let mut entries: Vec<_> = buckets.into_iter().collect();
        entries.sort_unstable();
        entries
    }

    fn split_until<F>(boxes: &mut Vec<ColorBox>, target: usize, priority: F)
    where
        F: Fn(&ColorBox) -> u64,
    {
        while boxes.len() < target {
            let candidate = boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| b.can_split())
                .max_by_key(|&(index, b)| (priority(b), std::cmp::Reverse(index)))
                .map(|(index, _)| index);

            let Some(index) = candidate else {
                break;
            };
            let chosen = boxes.remove(index);
            let (left, right) = chosen.split();
            boxes.push(left);
            boxes.push(right);
        }
    }
}

impl PaletteExtractor for MedianCut {
    fn extract(&self, image: &PixelGrid, count: usize) -> Result<Vec<ColorSignature>> {
        reject_empty_request(count)?;

        let mut entries = self.histogram(image, true);
        if entries.is_empty() {
            entries = self.histogram(image, false);
        }
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut boxes = vec![ColorBox { entries }];
        let population_target = ((count as f64) * 0.75).ceil() as usize;
        Self::split_until(&mut boxes, population_target.max(1), ColorBox::population);
        Self::split_until(&mut boxes, count, |b| b.population() * b.volume());

        let mut ranked: Vec<(u64, ColorSignature)> =
            boxes.iter().map(|b| (b.population(), b.average())).collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut palette: Vec<ColorSignature> = Vec::with_capacity(count);
        for (_, color) in ranked {
            if !palette.contains(&color) {
                palette.push(color);
            }
        }
        palette.truncate(count);
        Ok(palette)
    }
}

/// Evenly spaced, fully saturated hues; ignores the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HueWheel;

impl PaletteExtractor for HueWheel {
    fn extract(&self, _image: &PixelGrid, count: usize) -> Result<Vec<ColorSignature>> {
        reject_empty_request(count)?;
        Ok((0..count)
            .map(|i| hsv_to_rgb(i as f64 / count as f64, 1.0, 1.0))
            .collect())
    }

    fn quantizes(&self) -> bool {
        false
    }
}

/// HSV (all components in `[0, 1]`) to RGB, channels truncated to integers
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> ColorSignature {
    let to_channel = |x: f64| (x * 255.0).clamp(0.0, 255.0) as u8;
    if saturation <= 0.0 {
        let v = to_channel(value);
        return ColorSignature([v, v, v]);
    }

    let sector = (hue * 6.0).floor();
    let f = hue.mul_add(6.0, -sector);
    let p = value * (1.0 - saturation);
    let q = value * saturation.mul_add(-f, 1.0);
    let t = value * saturation.mul_add(-(1.0 - f), 1.0);

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    ColorSignature([to_channel(r), to_channel(g), to_channel(b)])
}
