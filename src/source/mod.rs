use std::collections::HashMap;
use std::sync::Arc;

use crate::render::buffer::PixelBuffer;

pub(crate) mod frame;
pub(crate) mod gif;
pub(crate) mod still;
pub(crate) mod text;
pub(crate) mod video;

use frame::Frame;
use video::VideoSource;

/// Opaque identifier of a video track supplied by an external compositing engine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TrackId(pub i32);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded source frames for one output frame, keyed by track.
pub type ExternalFrames = HashMap<TrackId, Arc<PixelBuffer>>;

/// Source variants, used for diagnostics and track discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Still image.
    Image,
    /// Animated GIF.
    Gif,
    /// Video, self-decoding or externally fed.
    Video,
    /// Rendered, animated text.
    Text,
}

/// Time-indexed provider of [`Frame`]s.
///
/// `frame_at` takes `&mut self` because video sources advance a decode cursor. Sources are owned
/// by exactly one surface and are never shared between concurrent renders.
pub trait Source: Send {
    /// Which variant this is.
    fn kind(&self) -> SourceKind;

    /// Frame for `time` seconds, or `None` when this source has nothing to show.
    ///
    /// `external` carries buffers for externally fed video tracks; other sources ignore it.
    fn frame_at(&mut self, time: f64, external: Option<&ExternalFrames>) -> Option<Frame>;

    /// Borrow as a video source, if it is one.
    fn as_video(&self) -> Option<&VideoSource> {
        None
    }

    /// Mutably borrow as a video source, if it is one.
    fn as_video_mut(&mut self) -> Option<&mut VideoSource> {
        None
    }
}
