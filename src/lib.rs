//! Scenecraft is a declarative, time-driven scene composition engine for short-form video and
//! GIF output.
//!
//! A [`Scene`] is a tree of [`Group`]s holding [`Layer`]s of [`Surface`]s. Each surface shows a
//! [`Source`] (image, GIF, video or animated text) placed in a frame rectangle. Groups carry
//! animated [`Filter`]s and an optional [`Mask`]. Rendering a scene at a time produces one
//! premultiplied [`Raster`]; the export drivers stream those frames into encoders:
//!
//! - Build a scene with [`Scene::add_asset`] or [`Scene::add_source`]
//! - Render single frames with [`Scene::render`]
//! - Export with [`FrameCompositor`] or queue exports on an [`ExportManager`]
//! - Drive a scene from an external compositing engine through [`SceneBridge`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod animation;
mod assets;
mod bridge;
mod effects;
mod encode;
mod export;
mod foundation;
mod render;
mod scene;
mod source;

pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, Point, Rect, Rgba8Premul, Size, Vec2,
};
pub use crate::foundation::error::{ScenecraftError, ScenecraftResult};

pub use crate::render::blur::blur_rgba8_premul;
pub use crate::render::buffer::PixelBuffer;
pub use crate::render::composite::{
    PremulRgba8, crossfade, crossfade_in_place, over, over_in_place,
};
pub use crate::render::context::{CompositingContext, RenderSettings, Sampling};
pub use crate::render::raster::Raster;

pub use crate::assets::decode::{GIF_DEFAULT_DELAY_SECS, decode_gif, decode_image, read_asset};
#[cfg(feature = "media-ffmpeg")]
pub use crate::assets::media::FfmpegDecoder;
pub use crate::assets::media::FfmpegDecoderFactory;

pub use crate::source::frame::Frame;
pub use crate::source::gif::{GifImage, GifSource};
pub use crate::source::still::ImageSource;
pub use crate::source::text::{TextAlignment, TextAnimation, TextSource, TextStyle, chunk_words};
pub use crate::source::video::{
    DEFAULT_NATURAL_SIZE, VideoDecoder, VideoDecoderFactory, VideoInfo, VideoSource,
};
pub use crate::source::{ExternalFrames, Source, SourceKind, TrackId};

pub use crate::animation::animator::{AnimatedRange, FilterAnimator, Lerp, PropertyValue};
pub use crate::animation::ease::Ease;
pub use crate::animation::tween::{BezierPath, BezierPoint, CubicBezier, Linear, TweenFunction};

pub use crate::effects::blur::{GaussianBlur, MAX_BLUR_RADIUS};
pub use crate::effects::color::ColorAdjustment;
pub use crate::effects::crystallize::Crystallize;
pub use crate::effects::filter::{Filter, FilterProperty, FilterTimes};
pub use crate::effects::geometry::{Fade, Rotate, Scale, Translate};
pub use crate::effects::glitch::Glitch;

pub use crate::scene::composition::{ActiveScene, Composition, OutputKind};
pub use crate::scene::group::Group;
pub use crate::scene::layer::Layer;
pub use crate::scene::mask::{Mask, RectMask};
pub use crate::scene::scene::{
    AssetKind, AssetSpec, LayerObjectIndex, Scene, TextAsset, Transition, TransitionKind,
};
pub use crate::scene::surface::Surface;

pub use crate::encode::factory::{
    EncoderFactory, InMemoryEncoderFactory, RecordedOutput, SystemEncoderFactory,
};
pub use crate::encode::ffmpeg::{
    FfmpegVideoWriter, VideoWriterOpts, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::gif::ImageGifWriter;
pub use crate::encode::sink::{
    GifWriter, InMemoryGifWriter, InMemoryVideoWriter, Recorded, VideoWriter, WriterState,
};

pub use crate::export::compositor::{
    ExportProgress, ExportReport, ExportState, FrameCompositor, OutputSink, RenderStats,
};
pub use crate::export::config::{
    ENV_OVERWRITE, ENV_READY_POLL_MS, ENV_READY_TIMEOUT_MS, ExportConfig,
};
pub use crate::export::manager::{ExportManager, ExportRequest, ExportTarget};

pub use crate::bridge::session::{
    BridgeError, BridgeOutput, BridgeQueue, CompositionRequest, SceneBridge,
};
pub use crate::bridge::tracks::{
    ExternalLoopPolicy, InsertSegment, PlannedTrack, TrackAssignment, TrackContent, TrackPlan,
    assign_track_ids,
};

pub use crate::analysis::{ContentBoundsDetector, Detector, Observation, ObservationKind};
