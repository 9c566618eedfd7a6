use std::path::Path;
use std::sync::Arc;

use crate::assets::decode::{decode_gif, read_asset};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::raster::Raster;
use crate::source::frame::Frame;
use crate::source::{ExternalFrames, Source, SourceKind};

/// Decoded GIF frames with their immutable delay table.
#[derive(Debug)]
pub struct GifImage {
    frames: Vec<Raster>,
    delays: Vec<f64>,
    duration: f64,
}

impl GifImage {
    /// Build from `(frame, delay_seconds)` pairs.
    pub fn from_frames(frames: Vec<(Raster, f64)>) -> ScenecraftResult<Self> {
        if frames.is_empty() {
            return Err(ScenecraftError::decode("gif contains no frames"));
        }
        if let Some((_, d)) = frames.iter().find(|(_, d)| !d.is_finite() || *d < 0.0) {
            return Err(ScenecraftError::decode(format!("invalid gif frame delay {d}")));
        }
        let (frames, delays): (Vec<_>, Vec<_>) = frames.into_iter().unzip();
        let duration = delays.iter().sum();
        Ok(Self {
            frames,
            delays,
            duration,
        })
    }

    /// Decode GIF container bytes.
    pub fn decode(bytes: &[u8]) -> ScenecraftResult<Self> {
        Self::from_frames(decode_gif(bytes)?)
    }

    /// Sum of all frame delays in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Per-frame delays in seconds.
    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    /// Index of the frame shown at `time`, wrapping when `looping`.
    pub fn frame_index_at(&self, time: f64, looping: bool) -> Option<usize> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        let time = if looping && self.duration > 0.0 && time >= self.duration {
            time % self.duration
        } else {
            time
        };
        let mut start = 0.0;
        for (idx, delay) in self.delays.iter().enumerate() {
            if time >= start && time < start + delay {
                return Some(idx);
            }
            start += delay;
        }
        None
    }
}

/// Animated GIF source.
#[derive(Clone, Debug)]
pub struct GifSource {
    image: Arc<GifImage>,
    looping: bool,
}

impl GifSource {
    /// Source over decoded frames; `looping` wraps time past the GIF duration.
    pub fn new(image: Arc<GifImage>, looping: bool) -> Self {
        Self { image, looping }
    }

    /// Decode a GIF file, looping by default.
    pub fn open(path: &Path) -> ScenecraftResult<Self> {
        let bytes = read_asset(path)?;
        Ok(Self::new(Arc::new(GifImage::decode(&bytes)?), true))
    }

    /// The decoded frames.
    pub fn image(&self) -> &Arc<GifImage> {
        &self.image
    }

    /// Whether time wraps modulo the GIF duration.
    pub fn looping(&self) -> bool {
        self.looping
    }
}

impl Source for GifSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Gif
    }

    fn frame_at(&mut self, time: f64, _external: Option<&ExternalFrames>) -> Option<Frame> {
        let idx = self.image.frame_index_at(time, self.looping)?;
        let raster = self.image.frames.get(idx)?.clone();
        Some(Frame::from_raster(raster, Some(time)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/gif.rs"]
mod tests;
