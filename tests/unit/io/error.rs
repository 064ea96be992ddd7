//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use photomosaic::MosaicError;
    use photomosaic::io::error::{capacity_error, fs_error, invalid_parameter};
    use std::error::Error;
    use std::path::PathBuf;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = fs_error("/tmp/test.png", "read")(io_error);

        assert!(error.source().is_some());
        let message = error.to_string();
        assert!(message.contains("read"));
        assert!(message.contains("/tmp/test.png"));
    }

    // Tests configuration errors carry parameter, value and reason
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("quality", &0, &"must be within 1..=100");

        let message = error.to_string();
        assert!(message.contains("quality"));
        assert!(message.contains("'0'"));
        assert!(message.contains("1..=100"));
        assert!(error.source().is_none());
        assert!(!error.is_encode());
    }

    // Tests capacity errors report requested and available amounts
    // Verified by swapping requested and available
    #[test]
    fn test_capacity_error() {
        let error = capacity_error("library tiles", 5, 2);
        assert!(matches!(
            error,
            MosaicError::Capacity { requested: 5, available: 2, .. }
        ));
        assert_eq!(error.to_string(), "Cannot provide 5 library tiles (only 2 available)");
    }

    // Tests encode errors are distinguishable from other failures
    // Verified by matching decode errors in is_encode
    #[test]
    fn test_is_encode() {
        let image_error = image::ImageError::IoError(std::io::Error::other("disk full"));
        let error = MosaicError::Encode {
            path: PathBuf::from("out.gif"),
            source: image_error,
        };
        assert!(error.is_encode());
        assert!(error.to_string().contains("out.gif"));

        let converted: MosaicError = image::ImageError::IoError(std::io::Error::other("bad")).into();
        assert!(matches!(converted, MosaicError::Decode { .. }));
        assert!(!converted.is_encode());
    }
}
