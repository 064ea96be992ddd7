//! Tests for default constants and configuration validation

#[cfg(test)]
mod tests {
    use photomosaic::MosaicError;
    use photomosaic::io::configuration::{
        DEFAULT_QUALITY, DEFAULT_TILE_SIZE, FilterParams, LibraryParams, MAX_CHANNEL_DISTANCE,
        MAX_MOSAIC_PIXELS, MosaicConfig, OutputToggles, TargetSize, ZoomSettings,
    };

    fn parameter_of(error: MosaicError) -> &'static str {
        match error {
            MosaicError::Configuration { parameter, .. } => parameter,
            _ => "",
        }
    }

    // Tests key constants keep their documented values
    // Verified by changing constant values
    #[test]
    fn test_constant_values() {
        assert_eq!(MAX_CHANNEL_DISTANCE, 765);
        assert_eq!(MAX_MOSAIC_PIXELS, 1_000_000_000);
        assert_eq!(DEFAULT_TILE_SIZE, 50);
        assert_eq!(DEFAULT_QUALITY, 90);
    }

    // Tests the default configuration is valid
    // Verified by defaulting the tile size to zero
    #[test]
    fn test_default_config_valid() {
        let config = MosaicConfig::new("tiles", "out");
        assert!(config.validate().is_ok());
        assert!(config.outputs.fullres && config.outputs.lowres);
        assert!(!config.outputs.needs_zoom_sequence());
    }

    // Tests each out-of-range option is reported by name
    // Verified by skipping the quality range check
    #[test]
    fn test_invalid_options_named() {
        let base = MosaicConfig::new("tiles", "out");

        let mut config = base.clone();
        config.tile_size = 0;
        assert_eq!(config.validate().map_err(parameter_of), Err("images_size"));

        let mut config = base.clone();
        config.num_images = Some(0);
        assert_eq!(config.validate().map_err(parameter_of), Err("num_images"));

        let mut config = base.clone();
        config.quality = 101;
        assert_eq!(config.validate().map_err(parameter_of), Err("quality"));

        let mut config = base.clone();
        config.output_extension = "xyz".to_string();
        assert_eq!(config.validate().map_err(parameter_of), Err("output_extension"));

        let mut config = base;
        config.library.filter.max_contrast = 766;
        assert_eq!(config.validate().map_err(parameter_of), Err("max_contrast"));
    }

    // Tests zoom settings are only checked when a zoom output is enabled
    // Verified by validating zoom settings unconditionally
    #[test]
    fn test_zoom_validated_on_demand() {
        let mut config = MosaicConfig::new("tiles", "out");
        config.zoom.increment = 1.0;
        assert!(config.validate().is_ok());

        config.outputs.gif = true;
        assert_eq!(config.validate().map_err(parameter_of), Err("zoom_incr"));
    }

    // Tests zoom factors must exceed one and displays must be at least 2x2
    // Verified by accepting a start factor of exactly 1
    #[test]
    fn test_zoom_settings_validate() {
        assert!(ZoomSettings::default().validate().is_ok());
        for broken in [
            ZoomSettings { start: 1.0, ..ZoomSettings::default() },
            ZoomSettings { increment: f64::NAN, ..ZoomSettings::default() },
            ZoomSettings { min_tile_span: 0, ..ZoomSettings::default() },
            ZoomSettings { display_width: 1, ..ZoomSettings::default() },
        ] {
            assert!(broken.validate().is_err());
        }
    }

    // Tests filter gates and library sizes
    // Verified by allowing a zero storage size
    #[test]
    fn test_library_params_validate() {
        assert!(LibraryParams::default().validate().is_ok());
        assert!(FilterParams::accept_all().is_permissive());
        assert!(!FilterParams::default().is_permissive());

        let params = LibraryParams { storage_size: Some(0), ..LibraryParams::default() };
        assert!(params.validate().is_err());

        let filter = FilterParams { min_color_diff: Some(800), ..FilterParams::default() };
        assert!(filter.validate().is_err());
    }

    // Tests output toggles report which stages are needed
    // Verified by leaving frame sequences out of the zoom check
    #[test]
    fn test_output_toggles() {
        let none = OutputToggles { fullres: false, lowres: false, ..OutputToggles::default() };
        assert!(!none.any());

        let frames = OutputToggles { frames_reversed: true, ..none };
        assert!(frames.needs_zoom_sequence());
        assert!(frames.any());
    }

    // Tests target resizing keeps the aspect ratio for a missing side
    // Verified by swapping width and height in the derived side
    #[test]
    fn test_target_size_resolve() {
        let width_only = TargetSize { width: Some(400), height: None };
        assert_eq!(width_only.resolve(800, 600).ok(), Some((400, 300)));

        let height_only = TargetSize { width: None, height: Some(100) };
        assert_eq!(height_only.resolve(800, 600).ok(), Some((133, 100)));

        let both = TargetSize { width: Some(10), height: Some(20) };
        assert_eq!(both.resolve(800, 600).ok(), Some((10, 20)));
    }

    // Tests invalid size tuples are rejected
    // Verified by allowing upscaling
    #[test]
    fn test_target_size_invalid() {
        let neither = TargetSize { width: None, height: None };
        let zero = TargetSize { width: Some(0), height: None };
        let larger = TargetSize { width: Some(1000), height: None };

        for size in [neither, zero, larger] {
            assert_eq!(size.resolve(800, 600).map_err(parameter_of), Err("target_size"));
        }
    }
}
