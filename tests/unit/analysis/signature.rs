//! Tests for area-averaged color signatures and their distances

#[cfg(test)]
mod tests {
    use crate::solid;
    use image::Rgb;
    use photomosaic::analysis::ColorSignature;
    use photomosaic::io::image::PixelGrid;
    use photomosaic::math::resample::resize_area;

    // Tests a uniform grid's signature is its color
    // Verified by averaging only the first row
    #[test]
    fn test_uniform_average() {
        let signature = ColorSignature::average(&solid(5, 3, [12, 34, 56]));
        assert_eq!(signature, ColorSignature::new(12, 34, 56));
    }

    // Tests exact halves round up
    // Verified by truncating the mean
    #[test]
    fn test_average_rounds_half_up() {
        let mut grid = PixelGrid::new(2, 1);
        grid.put_pixel(0, 0, Rgb([0, 10, 255]));
        grid.put_pixel(1, 0, Rgb([1, 11, 254]));

        assert_eq!(ColorSignature::average(&grid).channels(), [1, 11, 255]);
    }

    // Tests the signature equals an area resize down to one pixel
    // Verified by sampling the center pixel instead of averaging
    #[test]
    fn test_average_matches_area_resize() {
        let mut grid = PixelGrid::new(7, 5);
        for (x, y, pixel) in grid.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 37 % 256) as u8, (y * 51 % 256) as u8, ((x + y) * 13 % 256) as u8]);
        }

        let resized = resize_area(&grid, 1, 1);
        let expected = ColorSignature::from(*resized.get_pixel(0, 0));
        assert_eq!(ColorSignature::average(&grid), expected);
    }

    // Tests both distances on a known pair
    // Verified by dropping the blue channel from the sums
    #[test]
    fn test_distances() {
        let a = ColorSignature::new(10, 20, 30);
        let b = ColorSignature::new(13, 16, 30);
        assert_eq!(a.manhattan(&b), 7);
        assert_eq!(a.squared_euclidean(&b), 25);
        assert_eq!(b.manhattan(&a), 7);

        let black = ColorSignature::new(0, 0, 0);
        let white = ColorSignature::from([255, 255, 255]);
        assert_eq!(black.manhattan(&white), 765);
    }
}
