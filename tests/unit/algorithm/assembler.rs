//! Tests for tile rendering, per-pixel assignment and mosaic composition

#[cfg(test)]
mod tests {
    use crate::{library_of, solid};
    use image::Rgb;
    use photomosaic::MosaicError;
    use photomosaic::algorithm::assembler::{MosaicAssembler, TileSet, mosaic_dimensions};
    use photomosaic::algorithm::matcher::DistanceMetric;
    use photomosaic::io::configuration::MAX_MOSAIC_PIXELS;
    use photomosaic::io::image::{FileCodec, PixelGrid};
    use photomosaic::library::TileLibrary;

    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];
    const BLACK: [u8; 3] = [0, 0, 0];
    const WHITE: [u8; 3] = [255, 255, 255];

    fn tile_set(colors: &[[u8; 3]], tile_size: u32) -> TileSet {
        TileSet::prepare(&library_of(colors), tile_size, &FileCodec::default())
            .expect("Tile set should be prepared")
    }

    // Tests a 2x2 target with 4-pixel tiles composes to 8x8
    // Verified by multiplying only the width by the tile size
    #[test]
    fn test_mosaic_size_invariant() {
        let tiles = tile_set(&[BLACK, WHITE], 4);
        let mosaic = MosaicAssembler::new(&tiles, DistanceMetric::Euclidean)
            .assemble(&solid(2, 2, [20, 20, 20]), None)
            .expect("Assembly should succeed");
        assert_eq!(mosaic.dimensions(), (8, 8));
    }

    // Tests a red tile is reproduced as red, not with swapped channels
    // Verified by reversing channel order when copying blocks
    #[test]
    fn test_red_stays_red() {
        let tiles = tile_set(&[BLUE, RED], 3);
        let mosaic = MosaicAssembler::new(&tiles, DistanceMetric::Euclidean)
            .assemble(&solid(2, 1, [250, 5, 5]), None)
            .expect("Assembly should succeed");

        assert!(mosaic.pixels().all(|pixel| *pixel == Rgb(RED)));
    }

    // Tests each target pixel is assigned its nearest tile
    // Verified by assigning tile 0 everywhere
    #[test]
    fn test_assign_nearest_per_pixel() {
        let tiles = tile_set(&[BLACK, WHITE, RED], 2);
        let mut target = PixelGrid::new(3, 2);
        target.put_pixel(0, 0, Rgb([250, 250, 250]));
        target.put_pixel(1, 0, Rgb([200, 20, 20]));
        target.put_pixel(2, 1, Rgb([30, 30, 30]));

        let (assignment, stats) = MosaicAssembler::new(&tiles, DistanceMetric::Euclidean).assign(&target, None);

        assert_eq!(assignment.dim(), (2, 3));
        assert_eq!(assignment[[0, 0]], 1);
        assert_eq!(assignment[[0, 1]], 2);
        assert_eq!(assignment[[0, 2]], 0);
        assert_eq!(assignment[[1, 2]], 0);
        assert_eq!(stats.hits + stats.misses, 6);
    }

    // Tests blocks land at (row·S, col·S)
    // Verified by swapping row and column offsets in composition
    #[test]
    fn test_compose_block_placement() {
        let tiles = tile_set(&[RED, BLUE], 2);
        let mut target = PixelGrid::new(2, 1);
        target.put_pixel(0, 0, Rgb(BLUE));
        target.put_pixel(1, 0, Rgb(RED));

        let assembler = MosaicAssembler::new(&tiles, DistanceMetric::Manhattan);
        let (assignment, _) = assembler.assign(&target, None);
        let mosaic = assembler.compose(&assignment).expect("Composition should succeed");

        assert_eq!(mosaic.dimensions(), (4, 2));
        for y in 0..2 {
            assert_eq!(*mosaic.get_pixel(0, y), Rgb(BLUE));
            assert_eq!(*mosaic.get_pixel(1, y), Rgb(BLUE));
            assert_eq!(*mosaic.get_pixel(2, y), Rgb(RED));
            assert_eq!(*mosaic.get_pixel(3, y), Rgb(RED));
        }
    }

    // Tests tiles of other sizes are resized to the mosaic tile size
    // Verified by keeping tiles at their stored size
    #[test]
    fn test_prepare_resizes_blocks() {
        let tiles = tile_set(&[RED, BLUE], 7);
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles.tile_size(), 7);
        assert_eq!(tiles.block(1).map(PixelGrid::dimensions), Some((7, 7)));
        assert_eq!(tiles.signatures().len(), 2);
        assert!(tiles.block(2).is_none());
    }

    // Tests invalid tile sizes and empty libraries are rejected
    // Verified by accepting a zero tile size
    #[test]
    fn test_prepare_rejects_degenerate_input() {
        let codec = FileCodec::default();
        assert!(matches!(
            TileSet::prepare(&library_of(&[RED]), 0, &codec),
            Err(MosaicError::Configuration { .. })
        ));
        assert!(matches!(
            TileSet::prepare(&TileLibrary::default(), 4, &codec),
            Err(MosaicError::Capacity { .. })
        ));
    }

    // Tests the pixel ceiling and overflow guards
    // Verified by comparing against the ceiling with < instead of <=
    #[test]
    fn test_mosaic_dimensions_guard() {
        assert_eq!(mosaic_dimensions(10, 20, 5).ok(), Some((50, 100)));

        let side = (MAX_MOSAIC_PIXELS as f64).sqrt() as u32;
        assert!(mosaic_dimensions(side, side, 1).is_ok());
        assert!(matches!(
            mosaic_dimensions(side + 1, side + 1, 1),
            Err(MosaicError::Capacity { .. })
        ));
        assert!(mosaic_dimensions(u32::MAX, 1, 2).is_err());
    }
}
