use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::encode::ffmpeg::{FfmpegVideoWriter, VideoWriterOpts};
use crate::encode::gif::ImageGifWriter;
use crate::encode::sink::{
    GifWriter, InMemoryGifWriter, InMemoryVideoWriter, Recorded, VideoWriter,
};
use crate::foundation::error::ScenecraftResult;
use crate::render::buffer::PixelBuffer;

/// Creates the writers an export streams into.
pub trait EncoderFactory: Send + Sync {
    /// Open a video writer described by `opts`.
    fn video_writer(&self, opts: VideoWriterOpts) -> ScenecraftResult<Box<dyn VideoWriter>>;

    /// Open a GIF writer at `path` expecting about `frame_count` frames.
    fn gif_writer(&self, path: &Path, frame_count: u64) -> ScenecraftResult<Box<dyn GifWriter>>;
}

/// Writers backed by the system `ffmpeg` (MP4) and the `image` crate (GIF).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEncoderFactory;

impl EncoderFactory for SystemEncoderFactory {
    fn video_writer(&self, opts: VideoWriterOpts) -> ScenecraftResult<Box<dyn VideoWriter>> {
        Ok(Box::new(FfmpegVideoWriter::open(opts)?))
    }

    fn gif_writer(&self, path: &Path, frame_count: u64) -> ScenecraftResult<Box<dyn GifWriter>> {
        Ok(Box::new(ImageGifWriter::open(path, frame_count)?))
    }
}

/// One output produced through an [`InMemoryEncoderFactory`].
#[derive(Clone, Debug)]
pub enum RecordedOutput {
    /// A video with its `(time, frame)` pairs.
    Video {
        /// Requested output path.
        path: PathBuf,
        /// Frames as appended.
        frames: Recorded<(f64, PixelBuffer)>,
    },
    /// A GIF with its `(frame, delay)` pairs.
    Gif {
        /// Requested output path.
        path: PathBuf,
        /// Frames as added.
        frames: Recorded<(PixelBuffer, f64)>,
    },
}

impl RecordedOutput {
    /// Requested output path.
    pub fn path(&self) -> &Path {
        match self {
            Self::Video { path, .. } | Self::Gif { path, .. } => path,
        }
    }

    /// Number of frames written so far.
    pub fn frame_count(&self) -> usize {
        match self {
            Self::Video { frames, .. } => frames.lock().unwrap_or_else(PoisonError::into_inner).len(),
            Self::Gif { frames, .. } => frames.lock().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }
}

/// Factory for tests and previews: writers keep frames in memory and every output is recorded.
#[derive(Clone, Debug, Default)]
pub struct InMemoryEncoderFactory {
    busy_polls: u32,
    outputs: Arc<Mutex<Vec<RecordedOutput>>>,
}

impl InMemoryEncoderFactory {
    /// Factory whose writers are always ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Video writers report "not ready" for `polls` checks after every append.
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Outputs opened so far, in order.
    pub fn outputs(&self) -> Vec<RecordedOutput> {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, output: RecordedOutput) {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(output);
    }
}

impl EncoderFactory for InMemoryEncoderFactory {
    fn video_writer(&self, opts: VideoWriterOpts) -> ScenecraftResult<Box<dyn VideoWriter>> {
        let writer = InMemoryVideoWriter::new(opts.size)?.with_busy_polls(self.busy_polls);
        self.record(RecordedOutput::Video {
            path: opts.out_path,
            frames: writer.frames(),
        });
        Ok(Box::new(writer))
    }

    fn gif_writer(&self, path: &Path, _frame_count: u64) -> ScenecraftResult<Box<dyn GifWriter>> {
        let writer = InMemoryGifWriter::new();
        self.record(RecordedOutput::Gif {
            path: path.to_path_buf(),
            frames: writer.frames(),
        });
        Ok(Box::new(writer))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/factory.rs"]
mod tests;
