//! Error types for library curation, matching and rendering

use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// A configuration value or input location is unusable
    Configuration {
        /// Name of the offending parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to decode an image from the filesystem
    Decode {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// An encoder rejected an output artifact
    Encode {
        /// Path where the artifact was being written
        path: PathBuf,
        /// Underlying image encoding error
        source: image::ImageError,
    },

    /// Requested tile or palette count cannot be satisfied
    ///
    /// Also raised when the composed mosaic would exceed the pixel ceiling.
    Capacity {
        /// What was being requested
        resource: &'static str,
        /// Requested amount
        requested: u64,
        /// Amount actually available
        available: u64,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Library cache manifest could not be read or written
    Cache {
        /// Path to the manifest
        path: PathBuf,
        /// Underlying serialization error
        source: serde_json::Error,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid configuration '{parameter}' = '{value}': {reason}")
            }
            Self::Decode { path, source } => {
                write!(f, "Failed to decode image '{}': {source}", path.display())
            }
            Self::Encode { path, source } => {
                write!(f, "Failed to encode '{}': {source}", path.display())
            }
            Self::Capacity {
                resource,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Cannot provide {requested} {resource} (only {available} available)"
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Cache { path, source } => {
                write!(f, "Library cache error in '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } | Self::Encode { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Cache { source, .. } => Some(source),
            Self::Configuration { .. } | Self::Capacity { .. } => None,
        }
    }
}

impl MosaicError {
    /// Whether this error came from an encoder rejecting an artifact
    pub const fn is_encode(&self) -> bool {
        matches!(self, Self::Encode { .. })
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

impl From<image::ImageError> for MosaicError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create a configuration error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::Configuration {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a capacity error
pub fn capacity_error(resource: &'static str, requested: usize, available: usize) -> MosaicError {
    MosaicError::Capacity {
        resource,
        requested: requested as u64,
        available: available as u64,
    }
}

/// Wrap an I/O error with the path and operation it happened on
pub fn fs_error(
    path: impl Into<PathBuf>,
    operation: &'static str,
) -> impl FnOnce(std::io::Error) -> MosaicError {
    let path = path.into();
    move |source| MosaicError::FileSystem {
        path,
        operation,
        source,
    }
}
