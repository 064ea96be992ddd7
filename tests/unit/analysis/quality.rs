//! Tests for color deviation and edge contrast quality gates

#[cfg(test)]
mod tests {
    use crate::solid;
    use image::Rgb;
    use photomosaic::analysis::ColorSignature;
    use photomosaic::analysis::quality::{QualityReport, color_deviation, edge_contrast};
    use photomosaic::io::configuration::FilterParams;
    use photomosaic::io::image::PixelGrid;

    fn split_black_white(size: u32) -> PixelGrid {
        let mut grid = PixelGrid::new(size, size);
        for (x, _, pixel) in grid.enumerate_pixels_mut() {
            if x >= size / 2 {
                *pixel = Rgb([255, 255, 255]);
            }
        }
        grid
    }

    // Tests a uniform tile has no deviation and no contrast
    // Verified by measuring deviation against black instead of the signature
    #[test]
    fn test_uniform_tile_passes() {
        let grid = solid(8, 8, [90, 120, 200]);
        let report = QualityReport::measure(&grid, ColorSignature::average(&grid));

        assert!(report.color_deviation.abs() < 1e-9);
        assert!(report.contrast.abs() < 1e-9);
        assert!(report.passes(&FilterParams::default()));
        assert!(report.passes(&FilterParams { max_color_deviation: 0, max_contrast: 0, min_color_diff: None }));
    }

    // Tests deviation of a half black, half white tile
    // Verified by using the maximum instead of the mean distance
    #[test]
    fn test_color_deviation_split_tile() {
        let grid = split_black_white(4);
        let signature = ColorSignature::average(&grid);
        assert_eq!(signature, ColorSignature::new(128, 128, 128));

        let deviation = color_deviation(&grid, signature);
        assert!((deviation - 382.5).abs() < 1e-9);
    }

    // Tests contrast is measured between opposite edges
    // Verified by comparing the left column with itself
    #[test]
    fn test_edge_contrast_split_tile() {
        let contrast = edge_contrast(&split_black_white(4), 2);
        assert!((contrast[0] - 765.0).abs() < 1e-9);
        assert!(contrast[1].abs() < 1e-9);
    }

    // Tests a high-contrast tile fails the default gates but passes permissive ones
    // Verified by ignoring the contrast gate in passes
    #[test]
    fn test_gates() {
        let grid = split_black_white(6);
        let report = QualityReport::measure(&grid, ColorSignature::average(&grid));

        assert!(!report.passes(&FilterParams::default()));
        assert!(report.passes(&FilterParams::accept_all()));
        assert!(!report.passes(&FilterParams {
            max_color_deviation: 765,
            max_contrast: 700,
            min_color_diff: None,
        }));
    }
}
