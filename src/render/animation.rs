//! Animated encodings of a frame sequence

use crate::io::configuration::GIF_FRAME_DELAY_MS;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::io::image::{ImageCodec, PixelGrid, write_atomically, write_directory_atomically};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame};
use std::path::Path;

/// Timing of an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationOptions {
    /// Delay between frames
    pub frame_delay_ms: u32,
    /// Loop forever instead of playing once
    pub looping: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            frame_delay_ms: GIF_FRAME_DELAY_MS,
            looping: true,
        }
    }
}

/// Encodes an ordered sequence of frames to `path`
pub trait AnimationEncoder {
    /// Encode `frames` in order
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty sequence, an encode error if
    /// the encoder rejects a frame, or a file system error from writing
    fn encode(&self, frames: &[&PixelGrid], path: &Path, options: &AnimationOptions) -> Result<()>;
}

fn reject_empty(frames: &[&PixelGrid], path: &Path) -> Result<()> {
    if frames.is_empty() {
        return Err(invalid_parameter(
            "frames",
            &path.display(),
            &"an animation needs at least one frame",
        ));
    }
    Ok(())
}

/// Looping GIF through the `image` crate's encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GifAnimation;

impl AnimationEncoder for GifAnimation {
    fn encode(&self, frames: &[&PixelGrid], path: &Path, options: &AnimationOptions) -> Result<()> {
        reject_empty(frames, path)?;
        let encode_error = |source| MosaicError::Encode {
            path: path.to_path_buf(),
            source,
        };

        write_atomically(path, |writer| {
            let mut encoder = GifEncoder::new(writer);
            if options.looping {
                encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;
            }
            encoder
                .encode_frames(frames.iter().map(|frame| {
                    Frame::from_parts(
                        DynamicImage::ImageRgb8((*frame).clone()).into_rgba8(),
                        0,
                        0,
                        Delay::from_numer_denom_ms(options.frame_delay_ms, 1),
                    )
                }))
                .map_err(encode_error)
        })
    }
}

/// Numbered still frames in a directory, ready for an external video muxer
///
/// Frames are named `frame_00000.<ext>` upwards. The directory appears only
/// once every frame is written.
pub struct FrameSequence<'a, C: ImageCodec> {
    codec: &'a C,
    extension: String,
}

impl<'a, C: ImageCodec> FrameSequence<'a, C> {
    /// Sequence writer encoding frames with `codec` as `extension` files
    pub fn new(codec: &'a C, extension: impl Into<String>) -> Self {
        Self {
            codec,
            extension: extension.into(),
        }
    }
}

impl<C: ImageCodec> AnimationEncoder for FrameSequence<'_, C> {
    fn encode(&self, frames: &[&PixelGrid], path: &Path, _options: &AnimationOptions) -> Result<()> {
        reject_empty(frames, path)?;
        write_directory_atomically(path, |staging| {
            for (index, frame) in frames.iter().enumerate() {
                let name = format!("frame_{index:05}.{}", self.extension);
                self.codec.save(frame, &staging.join(name))?;
            }
            Ok(())
        })
    }
}
