//! Tests for the file codec, atomic writes and image discovery

#[cfg(test)]
mod tests {
    use crate::{solid, write_png};
    use image::Rgb;
    use photomosaic::MosaicError;
    use photomosaic::io::image::{
        FileCodec, ImageCodec, is_supported_image, list_images, write_atomically,
        write_directory_atomically,
    };
    use std::io::Write;

    // Tests a PNG round trip keeps channel order
    // Verified by decoding as BGR
    #[test]
    fn test_png_keeps_channels() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let codec = FileCodec::default();
        let path = dir.path().join("red.png");

        codec.save(&solid(3, 2, [255, 0, 0]), &path).expect("Save should succeed");
        let loaded = codec.load(&path).expect("Load should succeed");

        assert_eq!(loaded.dimensions(), (3, 2));
        assert!(loaded.pixels().all(|pixel| *pixel == Rgb([255, 0, 0])));
    }

    // Tests JPEG output honors the quality setting
    // Verified by ignoring quality in the JPEG encoder
    #[test]
    fn test_jpeg_quality_affects_size() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut grid = solid(64, 64, [0, 0, 0]);
        for (x, y, pixel) in grid.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8]);
        }

        let low = dir.path().join("low.jpg");
        let high = dir.path().join("high.jpg");
        FileCodec::new(10).save(&grid, &low).expect("Save should succeed");
        FileCodec::new(100).save(&grid, &high).expect("Save should succeed");

        let size = |path| std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
        assert!(size(&low) < size(&high));
        assert_eq!(FileCodec::new(0).quality(), 1);
    }

    // Tests unreadable images are decode errors naming the file
    // Verified by mapping decode failures to file system errors
    #[test]
    fn test_load_invalid_image() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").expect("Failed to write fixture");

        let result = FileCodec::default().load(&path);
        assert!(matches!(result, Err(MosaicError::Decode { path: ref failed, .. }) if *failed == path));
    }

    // Tests a failed write leaves no file behind
    // Verified by writing directly to the destination
    #[test]
    fn test_write_atomically_all_or_nothing() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested/out.txt");

        let failed = write_atomically(&path, |writer| {
            writer.write_all(b"partial").map_err(MosaicError::from)?;
            Err(photomosaic::io::error::invalid_parameter("test", &1, &"forced failure"))
        });
        assert!(failed.is_err());
        assert!(!path.exists());

        write_atomically(&path, |writer| writer.write_all(b"done").map_err(MosaicError::from))
            .expect("Write should succeed");
        assert_eq!(std::fs::read_to_string(&path).ok().as_deref(), Some("done"));

        let leftovers = std::fs::read_dir(dir.path().join("nested")).map(Iterator::count).unwrap_or(0);
        assert_eq!(leftovers, 1);
    }

    // Tests a staged directory replaces the old one only on success
    // Verified by removing the old directory before filling the new one
    #[test]
    fn test_write_directory_atomically() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let target = dir.path().join("frames");

        write_directory_atomically(&target, |staging| {
            std::fs::write(staging.join("a.txt"), "first").map_err(MosaicError::from)
        })
        .expect("First fill should succeed");

        let failed = write_directory_atomically(&target, |staging| {
            std::fs::write(staging.join("b.txt"), "second").map_err(MosaicError::from)?;
            Err(photomosaic::io::error::invalid_parameter("test", &2, &"forced failure"))
        });
        assert!(failed.is_err());
        assert!(target.join("a.txt").exists());
        assert!(!target.join("b.txt").exists());
    }

    // Tests discovery lists decodable images sorted by name, skipping others
    // Verified by returning directory order
    #[test]
    fn test_list_images() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_png(dir.path(), "b", &solid(1, 1, [0, 0, 0]));
        write_png(dir.path(), "a", &solid(1, 1, [0, 0, 0]));
        write_png(dir.path(), ".hidden", &solid(1, 1, [0, 0, 0]));
        std::fs::write(dir.path().join("notes.txt"), "x").expect("Failed to write fixture");

        let files = list_images(dir.path()).expect("Listing should succeed");
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert!(!is_supported_image(&dir.path().join("notes.txt")));
    }

    // Tests missing and empty folders are configuration errors
    // Verified by returning an empty list for an empty folder
    #[test]
    fn test_list_images_missing_or_empty() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        assert!(matches!(
            list_images(&dir.path().join("absent")),
            Err(MosaicError::Configuration { .. })
        ));
        assert!(matches!(
            list_images(dir.path()),
            Err(MosaicError::Configuration { .. })
        ));
    }
}
