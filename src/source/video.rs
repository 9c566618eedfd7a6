use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::core::{Affine, Size};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::buffer::PixelBuffer;
use crate::source::frame::Frame;
use crate::source::{ExternalFrames, Source, SourceKind, TrackId};

/// Size assumed for videos whose dimensions are unknown.
pub const DEFAULT_NATURAL_SIZE: Size = Size::new(1920.0, 1080.0);

/// Metadata reported by a video decoder when it is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// File the frames come from, when known.
    pub path: Option<PathBuf>,
    /// Duration in seconds.
    pub duration: f64,
    /// Nominal frames per second.
    pub frame_rate: f64,
    /// Encoded frame size in pixels.
    pub natural_size: Size,
    /// Preferred display transform (rotation metadata).
    pub transform: Affine,
}

/// Sequential frame reader for one video file.
pub trait VideoDecoder: Send {
    /// Metadata captured at open.
    fn info(&self) -> &VideoInfo;

    /// Next decoded frame and its presentation time, or `None` at end of stream.
    fn next_frame(&mut self) -> ScenecraftResult<Option<(PixelBuffer, f64)>>;

    /// Rewind to the first frame.
    fn restart(&mut self) -> ScenecraftResult<()>;
}

/// Opens [`VideoDecoder`]s for asset paths.
pub trait VideoDecoderFactory: Send + Sync {
    /// Open `path` for sequential decoding.
    fn open(&self, path: &Path) -> ScenecraftResult<Box<dyn VideoDecoder>>;
}

type TimedBuffer = (Arc<PixelBuffer>, f64);

enum VideoMode {
    SelfManaged {
        decoder: Box<dyn VideoDecoder>,
        last: TimedBuffer,
        current: Option<TimedBuffer>,
    },
    External {
        track_id: TrackId,
    },
}

/// Video source, either decoding its own file or reading frames supplied per render call.
pub struct VideoSource {
    info: VideoInfo,
    mode: VideoMode,
}

impl VideoSource {
    /// Self-managed source; primes the first two frames.
    pub fn open(mut decoder: Box<dyn VideoDecoder>) -> ScenecraftResult<Self> {
        let info = decoder.info().clone();
        let (last, current) = prime(decoder.as_mut())?;
        Ok(Self {
            info,
            mode: VideoMode::SelfManaged {
                decoder,
                last,
                current,
            },
        })
    }

    /// Externally fed source reading `track_id` from the caller-supplied frame map.
    pub fn external(track_id: TrackId, info: VideoInfo) -> Self {
        Self {
            info,
            mode: VideoMode::External { track_id },
        }
    }

    /// Metadata of the underlying video.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Encoded size, falling back to 1920x1080 when unknown.
    pub fn natural_size(&self) -> Size {
        let s = self.info.natural_size;
        if s.width > 0.0 && s.height > 0.0 {
            s
        } else {
            DEFAULT_NATURAL_SIZE
        }
    }

    /// Track identifier when externally fed.
    pub fn track_id(&self) -> Option<TrackId> {
        match self.mode {
            VideoMode::External { track_id } => Some(track_id),
            VideoMode::SelfManaged { .. } => None,
        }
    }

    /// `true` when this source owns a decode session.
    pub fn is_self_managed(&self) -> bool {
        matches!(self.mode, VideoMode::SelfManaged { .. })
    }

    /// Drop the decode session and read frames for `track_id` from the external map instead.
    pub fn feed_externally(&mut self, track_id: TrackId) {
        self.mode = VideoMode::External { track_id };
    }

    fn self_managed_frame(&mut self, time: f64) -> Option<Frame> {
        let duration = self.info.duration;
        let VideoMode::SelfManaged {
            decoder,
            last,
            current,
        } = &mut self.mode
        else {
            return None;
        };

        let looped = if duration > 0.0 {
            time.rem_euclid(duration)
        } else {
            time
        };

        let Some(cur) = current.take() else {
            // Single-frame stream.
            return Some(timed_frame(last));
        };
        if looped >= last.1 && looped < cur.1 {
            let frame = timed_frame(last);
            *current = Some(cur);
            return Some(frame);
        }

        *last = cur;
        let next = decoder.next_frame().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "video decode failed, treating as end of stream");
            None
        });
        match next {
            Some((buf, t)) => {
                let next = (Arc::new(buf), t);
                let frame = timed_frame(&next);
                *current = Some(next);
                Some(frame)
            }
            None => {
                let fallback = timed_frame(last);
                tracing::debug!(time, "video reached end of stream, restarting");
                let reopened = decoder
                    .restart()
                    .and_then(|()| prime(decoder.as_mut()));
                match reopened {
                    Ok((l, c)) => {
                        *last = l;
                        *current = c;
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to restart video decoder"),
                }
                Some(fallback)
            }
        }
    }
}

impl std::fmt::Debug for VideoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSource")
            .field("info", &self.info)
            .field("track_id", &self.track_id())
            .finish()
    }
}

fn timed_frame(entry: &TimedBuffer) -> Frame {
    Frame::from_buffer(Arc::clone(&entry.0), Some(entry.1))
}

fn prime(decoder: &mut dyn VideoDecoder) -> ScenecraftResult<(TimedBuffer, Option<TimedBuffer>)> {
    let (buf, t) = decoder
        .next_frame()?
        .ok_or_else(|| ScenecraftError::decode("video has no frames"))?;
    let current = decoder.next_frame()?.map(|(b, t)| (Arc::new(b), t));
    Ok(((Arc::new(buf), t), current))
}

impl Source for VideoSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Video
    }

    fn frame_at(&mut self, time: f64, external: Option<&ExternalFrames>) -> Option<Frame> {
        match self.mode {
            VideoMode::External { track_id } => {
                let buffer = external?.get(&track_id)?;
                Some(Frame::from_buffer(Arc::clone(buffer), Some(time)))
            }
            VideoMode::SelfManaged { .. } => self.self_managed_frame(time),
        }
    }

    fn as_video(&self) -> Option<&VideoSource> {
        Some(self)
    }

    fn as_video_mut(&mut self) -> Option<&mut VideoSource> {
        Some(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/video.rs"]
mod tests;
