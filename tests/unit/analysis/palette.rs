//! Tests for median-cut and hue-wheel palette extraction

#[cfg(test)]
mod tests {
    use crate::solid;
    use image::Rgb;
    use photomosaic::MosaicError;
    use photomosaic::analysis::ColorSignature;
    use photomosaic::analysis::palette::{HueWheel, MedianCut, PaletteExtractor, hsv_to_rgb};
    use photomosaic::io::image::PixelGrid;

    fn stripes(colors: &[([u8; 3], u32)]) -> PixelGrid {
        let height: u32 = colors.iter().map(|(_, rows)| rows).sum();
        let mut grid = PixelGrid::new(8, height);
        let mut y = 0;
        for &(rgb, rows) in colors {
            for row in y..y + rows {
                for x in 0..8 {
                    grid.put_pixel(x, row, Rgb(rgb));
                }
            }
            y += rows;
        }
        grid
    }

    // Tests a uniform image yields its own color, up to bucket precision
    // Verified by averaging bucket indices without rescaling them
    #[test]
    fn test_median_cut_uniform() {
        let palette = MedianCut::new(1)
            .extract(&solid(10, 10, [255, 0, 0]), 4)
            .expect("Extraction should succeed");

        assert_eq!(palette.len(), 1);
        let red = ColorSignature::new(255, 0, 0);
        assert!(palette.iter().all(|color| color.manhattan(&red) <= 12));
    }

    // Tests colors are ordered by population
    // Verified by sorting boxes by ascending population
    #[test]
    fn test_median_cut_population_order() {
        let image = stripes(&[([0, 0, 200], 2), ([200, 0, 0], 6)]);
        let palette = MedianCut::new(1).extract(&image, 2).expect("Extraction should succeed");

        assert_eq!(palette.len(), 2);
        let first = palette.first().copied().unwrap_or_default();
        let second = palette.get(1).copied().unwrap_or_default();
        assert!(first.manhattan(&ColorSignature::new(200, 0, 0)) <= 12);
        assert!(second.manhattan(&ColorSignature::new(0, 0, 200)) <= 12);
    }

    // Tests near-white pixels are ignored unless nothing else remains
    // Verified by disabling the white filter
    #[test]
    fn test_median_cut_skips_white() {
        let image = stripes(&[([255, 255, 255], 7), ([0, 120, 0], 1)]);
        let palette = MedianCut::new(1).extract(&image, 1).expect("Extraction should succeed");
        let green = palette.first().copied().unwrap_or_default();
        assert!(green.manhattan(&ColorSignature::new(0, 120, 0)) <= 12);

        let all_white = MedianCut::new(1)
            .extract(&solid(4, 4, [255, 255, 255]), 1)
            .expect("Extraction should succeed");
        assert_eq!(all_white.len(), 1);
    }

    // Tests the palette never exceeds the requested size
    // Verified by removing the final truncation
    #[test]
    fn test_median_cut_respects_count() {
        let mut image = PixelGrid::new(16, 16);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 16) as u8, (y * 16) as u8, 60]);
        }
        let palette = MedianCut::new(1).extract(&image, 5).expect("Extraction should succeed");

        assert!(!palette.is_empty());
        assert!(palette.len() <= 5);
    }

    // Tests a zero-sized request is a configuration error
    // Verified by returning an empty palette instead
    #[test]
    fn test_zero_count_rejected() {
        let image = solid(2, 2, [1, 2, 3]);
        assert!(matches!(
            MedianCut::default().extract(&image, 0),
            Err(MosaicError::Configuration { .. })
        ));
        assert!(matches!(
            HueWheel.extract(&image, 0),
            Err(MosaicError::Configuration { .. })
        ));
    }

    // Tests the hue wheel spaces saturated hues evenly
    // Verified by spacing hues over count - 1 steps
    #[test]
    fn test_hue_wheel() {
        let palette = HueWheel
            .extract(&solid(1, 1, [0, 0, 0]), 3)
            .expect("Extraction should succeed");
        assert_eq!(
            palette,
            vec![
                ColorSignature::new(255, 0, 0),
                ColorSignature::new(0, 255, 0),
                ColorSignature::new(0, 0, 255),
            ]
        );
    }

    // Tests HSV conversion at primaries and zero saturation
    // Verified by swapping the p and t terms in the first sector
    #[test]
    fn test_hsv_to_rgb() {
        assert_eq!(hsv_to_rgb(0.5, 1.0, 1.0), ColorSignature::new(0, 255, 255));
        assert_eq!(hsv_to_rgb(0.0, 0.0, 0.5), ColorSignature::new(127, 127, 127));
        assert_eq!(hsv_to_rgb(1.0 / 6.0, 1.0, 1.0), ColorSignature::new(255, 255, 0));
    }
}
