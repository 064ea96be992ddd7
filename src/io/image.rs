//! Raster decode/encode at the filesystem boundary
//!
//! Every grid handed to the pipeline is 8-bit RGB. Channel order is settled
//! here, once: decoders hand back RGB regardless of the file's layout and
//! encoders are fed RGB.

use crate::io::error::{MosaicError, Result, fs_error, invalid_parameter};
use crate::math::resample::{Region, resize_area, resize_area_region};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, ImageFormat, Rgb};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 8-bit RGB pixel grid, `height × width × 3`
pub type PixelGrid = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Decode, encode and resize capability used by every pipeline stage
pub trait ImageCodec: Sync {
    /// Decode the image at `path` into RGB
    ///
    /// # Errors
    ///
    /// Returns a decode error naming `path` if the file cannot be read or parsed
    fn load(&self, path: &Path) -> Result<PixelGrid>;

    /// Encode `grid` to `path`, choosing the format from the extension
    ///
    /// # Errors
    ///
    /// Returns an encode error if the encoder rejects the grid, or a file
    /// system error if the destination cannot be written
    fn save(&self, grid: &PixelGrid, path: &Path) -> Result<()>;

    /// Resize to exactly `width × height`
    fn resize(&self, grid: &PixelGrid, width: u32, height: u32) -> PixelGrid;

    /// Resize `region` of `grid` to exactly `width × height`
    ///
    /// The default copies the region out first; implementations that can
    /// sample in place should override it.
    fn resize_region(&self, grid: &PixelGrid, region: Region, width: u32, height: u32) -> PixelGrid {
        let crop = image::imageops::crop_imm(grid, region.x, region.y, region.width, region.height);
        self.resize(&crop.to_image(), width, height)
    }
}

/// `ImageCodec` backed by the `image` crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileCodec {
    quality: u8,
}

impl Default for FileCodec {
    fn default() -> Self {
        Self::new(crate::io::configuration::DEFAULT_QUALITY)
    }
}

impl FileCodec {
    /// Codec encoding lossy formats at `quality` (clamped to 1..=100)
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Lossy encoding quality in use
    pub const fn quality(&self) -> u8 {
        self.quality
    }
}

impl ImageCodec for FileCodec {
    fn load(&self, path: &Path) -> Result<PixelGrid> {
        let img = image::open(path).map_err(|e| MosaicError::Decode {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(img.into_rgb8())
    }

    fn save(&self, grid: &PixelGrid, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path).map_err(|e| MosaicError::Encode {
            path: path.to_path_buf(),
            source: e,
        })?;
        let quality = self.quality;

        write_atomically(path, |writer| {
            let encoded = if format == ImageFormat::Jpeg {
                grid.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))
            } else {
                grid.write_to(writer, format)
            };
            encoded.map_err(|e| MosaicError::Encode {
                path: path.to_path_buf(),
                source: e,
            })
        })
    }

    fn resize(&self, grid: &PixelGrid, width: u32, height: u32) -> PixelGrid {
        resize_area(grid, width, height)
    }

    fn resize_region(&self, grid: &PixelGrid, region: Region, width: u32, height: u32) -> PixelGrid {
        resize_area_region(grid, region, width, height)
    }
}

/// Write a file through a temporary sibling and rename it into place
///
/// Either the complete file appears at `path` or nothing does.
///
/// # Errors
///
/// Propagates the writer's error, or a file system error if the temporary
/// file cannot be created, flushed or persisted
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut std::fs::File>) -> Result<()>,
{
    let parent = parent_dir(path);
    std::fs::create_dir_all(&parent).map_err(fs_error(&parent, "create directory"))?;

    let mut staging = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(&parent)
        .map_err(fs_error(&parent, "create temporary file"))?;

    {
        let mut writer = BufWriter::new(staging.as_file_mut());
        write(&mut writer)?;
        writer.flush().map_err(fs_error(path, "flush"))?;
    }

    staging
        .persist(path)
        .map_err(|e| fs_error(path, "rename into place")(e.error))?;
    Ok(())
}

/// Populate a directory through a staging sibling and rename it into place
///
/// A previous directory at `path` is replaced only once `fill` succeeded.
///
/// # Errors
///
/// Propagates `fill`'s error, or a file system error from staging or renaming
pub fn write_directory_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let parent = parent_dir(path);
    std::fs::create_dir_all(&parent).map_err(fs_error(&parent, "create directory"))?;

    let staging = tempfile::Builder::new()
        .prefix(".partial-")
        .tempdir_in(&parent)
        .map_err(fs_error(&parent, "create staging directory"))?;

    fill(staging.path())?;

    if path.exists() {
        std::fs::remove_dir_all(path).map_err(fs_error(path, "replace directory"))?;
    }
    std::fs::rename(staging.path(), path).map_err(fs_error(path, "rename into place"))?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether `path` has an extension a decoder is registered for
pub fn is_supported_image(path: &Path) -> bool {
    path.is_file()
        && !path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'))
        && ImageFormat::from_path(path).is_ok_and(|format| format.can_read())
}

/// List decodable images in `folder`, sorted by file name
///
/// # Errors
///
/// Returns a configuration error if `folder` is missing or holds no images,
/// or a file system error if it cannot be listed
pub fn list_images(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(invalid_parameter(
            "tiles_dir",
            &folder.display(),
            &"folder does not exist",
        ));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(fs_error(folder, "list directory"))? {
        let path = entry.map_err(fs_error(folder, "list directory"))?.path();
        if is_supported_image(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(invalid_parameter(
            "tiles_dir",
            &folder.display(),
            &"folder contains no images",
        ));
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
