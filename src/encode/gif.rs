use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::GifWriter;
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::buffer::PixelBuffer;

/// Animated GIF file writer built on the `image` crate encoder. Loops forever.
pub struct ImageGifWriter {
    path: PathBuf,
    expected_frames: u64,
    written: u64,
    encoder: Option<GifEncoder<BufWriter<File>>>,
}

impl ImageGifWriter {
    /// Create `path` for a GIF of roughly `frame_count` frames.
    pub fn open(path: &Path, frame_count: u64) -> ScenecraftResult<Self> {
        ensure_parent_dir(path)?;
        let file = File::create(path)
            .with_context(|| format!("failed to create gif '{}'", path.display()))?;
        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ScenecraftError::encode(format!("gif repeat setup failed: {e}")))?;
        Ok(Self {
            path: path.to_path_buf(),
            expected_frames: frame_count,
            written: 0,
            encoder: Some(encoder),
        })
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.written
    }
}

impl GifWriter for ImageGifWriter {
    fn add_frame(&mut self, buffer: &PixelBuffer, delay: f64) -> ScenecraftResult<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| ScenecraftError::encode("gif writer is already finalized"))?;
        let image = RgbaImage::from_raw(buffer.width, buffer.height, buffer.straight_data())
            .ok_or_else(|| ScenecraftError::encode("gif frame size does not match its data"))?;
        let frame = Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(delay_ms(delay), 1));
        encoder
            .encode_frame(frame)
            .map_err(|e| ScenecraftError::encode(format!("gif frame encode failed: {e}")))?;
        self.written += 1;
        Ok(())
    }

    fn finalize(&mut self) -> ScenecraftResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| ScenecraftError::encode("gif writer is already finalized"))?;
        // The trailer is written when the encoder drops.
        drop(encoder);
        if self.written == 0 {
            return Err(ScenecraftError::encode(format!(
                "gif '{}' has no frames",
                self.path.display()
            )));
        }
        if self.written != self.expected_frames {
            tracing::debug!(
                expected = self.expected_frames,
                written = self.written,
                "gif frame count differs from plan"
            );
        }
        Ok(())
    }
}

pub(crate) fn delay_ms(delay: f64) -> u32 {
    if !delay.is_finite() || delay <= 0.0 {
        return 0;
    }
    (delay * 1000.0).round().min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
