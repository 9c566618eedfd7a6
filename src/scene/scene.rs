use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::core::{Canvas, Fps, Rect};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::context::CompositingContext;
use crate::render::raster::Raster;
use crate::scene::group::Group;
use crate::scene::layer::Layer;
use crate::scene::surface::Surface;
use crate::source::gif::{GifImage, GifSource};
use crate::source::still::ImageSource;
use crate::source::text::{TextAnimation, TextSource, TextStyle};
use crate::source::video::VideoSource;
use crate::source::{ExternalFrames, Source};

/// Address of a layer: a path of child-group indices from the scene root, then a layer index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerObjectIndex {
    /// Child indices walked from the root group.
    pub group_indices: Vec<usize>,
    /// Layer within the addressed group.
    pub layer_index: usize,
}

impl LayerObjectIndex {
    /// Index of `layer_index` in the group at `group_indices`.
    pub fn new(group_indices: Vec<usize>, layer_index: usize) -> Self {
        Self {
            group_indices,
            layer_index,
        }
    }

    /// Parse `g0/g1:layer`; the group path may be empty (`:2` is root layer 2).
    pub fn parse(s: &str) -> ScenecraftResult<Self> {
        let (groups, layer) = s
            .split_once(':')
            .ok_or_else(|| ScenecraftError::validation(format!("layer index '{s}' needs ':'")))?;
        let layer_index = layer
            .trim()
            .parse::<usize>()
            .map_err(|_| ScenecraftError::validation(format!("invalid layer index in '{s}'")))?;
        let group_indices = groups
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<usize>().map_err(|_| {
                    ScenecraftError::validation(format!("invalid group index '{p}' in '{s}'"))
                })
            })
            .collect::<ScenecraftResult<Vec<_>>>()?;
        Ok(Self {
            group_indices,
            layer_index,
        })
    }
}

/// How a scene hands over to the next one in a composition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Hard cut; a positive duration still overlaps the scenes.
    #[default]
    None,
    /// Crossfade across the overlap.
    Fade,
}

/// Outgoing transition of a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transition {
    /// Blend style.
    pub kind: TransitionKind,
    /// Overlap with the next scene in seconds.
    pub duration: f64,
}

impl Transition {
    /// Crossfade lasting `duration` seconds.
    pub fn fade(duration: f64) -> Self {
        Self {
            kind: TransitionKind::Fade,
            duration,
        }
    }
}

/// Text asset settings.
#[derive(Clone, Debug, PartialEq)]
pub struct TextAsset {
    /// Words to cycle through.
    pub words: Vec<String>,
    /// Visual style.
    pub style: TextStyle,
    /// Transition between chunks.
    pub animation: TextAnimation,
    /// Seconds per chunk.
    pub word_duration: f64,
    /// Character budget per chunk.
    pub max_characters: usize,
}

impl TextAsset {
    /// Default-styled text showing `words`.
    pub fn new(words: Vec<String>) -> Self {
        Self {
            words,
            style: TextStyle::default(),
            animation: TextAnimation::default(),
            word_duration: 1.0,
            max_characters: 20,
        }
    }
}

/// What to load for an asset.
#[derive(Clone, Debug, PartialEq)]
pub enum AssetKind {
    /// Still image file.
    Image(PathBuf),
    /// Animated GIF file.
    Gif {
        /// File to decode.
        path: PathBuf,
        /// Wrap time past the end.
        looping: bool,
    },
    /// Video file decoded by the context's decoder factory.
    Video(PathBuf),
    /// Rendered text.
    Text(TextAsset),
}

/// Asset to place: its content plus target rect and rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetSpec {
    /// Content.
    pub kind: AssetKind,
    /// Target rect in canvas pixels.
    pub frame: Rect,
    /// Rotation in radians.
    pub rotation: f64,
}

impl AssetSpec {
    fn build_source(&self, ctx: &CompositingContext) -> ScenecraftResult<Box<dyn Source>> {
        Ok(match &self.kind {
            AssetKind::Image(path) => Box::new(ImageSource::open(path)?),
            AssetKind::Gif { path, looping } => {
                let bytes = crate::assets::decode::read_asset(path)?;
                let image = Arc::new(GifImage::decode(&bytes)?);
                Box::new(GifSource::new(image, *looping))
            }
            AssetKind::Video(path) => {
                let decoder = ctx.decoders().open(path)?;
                Box::new(VideoSource::open(decoder)?)
            }
            AssetKind::Text(text) => {
                let w = self.frame.width().round().max(1.0) as u32;
                let h = self.frame.height().round().max(1.0) as u32;
                let source = TextSource::new(text.words.clone(), Canvas::new(w, h)?, ctx)
                    .with_style(text.style.clone())
                    .with_animation(text.animation)
                    .with_word_duration(text.word_duration)?
                    .with_max_characters(text.max_characters)?;
                Box::new(source)
            }
        })
    }
}

/// Root group plus timing and canvas: the addressable authoring unit.
pub struct Scene {
    id: String,
    duration: f64,
    frame_rate: Fps,
    canvas: Canvas,
    transition: Transition,
    group: Group,
}

impl Scene {
    /// Empty scene of `duration` seconds on the default 1200x675 canvas.
    pub fn new(duration: f64, frame_rate: Fps) -> ScenecraftResult<Self> {
        validate_duration(duration)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            duration,
            frame_rate,
            canvas: Canvas::default(),
            transition: Transition::default(),
            group: Group::new(),
        })
    }

    /// Replace the generated identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Replace the canvas.
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Replace the outgoing transition.
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Output file name for this scene's intermediate render.
    pub fn file_name(&self) -> String {
        format!("{}.mp4", self.id)
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Change the duration.
    pub fn set_duration(&mut self, duration: f64) -> ScenecraftResult<()> {
        validate_duration(duration)?;
        self.duration = duration;
        Ok(())
    }

    /// Frame rate.
    pub fn frame_rate(&self) -> Fps {
        self.frame_rate
    }

    /// Change the frame rate.
    pub fn set_frame_rate(&mut self, frame_rate: Fps) {
        self.frame_rate = frame_rate;
    }

    /// Canvas size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Outgoing transition.
    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Root group.
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Root group, mutably.
    pub fn group_mut(&mut self) -> &mut Group {
        &mut self.group
    }

    /// Number of frames an export renders: `floor(duration * fps)`.
    pub fn frame_count(&self) -> u64 {
        self.frame_rate.secs_to_frames_floor(self.duration)
    }

    /// Scene time of frame `index`.
    pub fn frame_time(&self, index: u64) -> f64 {
        self.frame_rate.frames_to_secs(index)
    }

    /// Group reached by walking `indices` from the root.
    ///
    /// With `create`, missing children are appended (each holding one empty layer) until the
    /// path exists; otherwise an out-of-range index yields `None`.
    pub fn group_at(&mut self, indices: &[usize], create: bool) -> Option<&mut Group> {
        let mut group = &mut self.group;
        for &i in indices {
            if i >= group.groups.len() {
                if !create {
                    return None;
                }
                group.groups.resize_with(i + 1, Group::with_empty_layer);
            }
            group = &mut group.groups[i];
        }
        Some(group)
    }

    /// Layer addressed by `index`, growing the tree like [`Scene::group_at`] when `create`.
    pub fn layer_at(&mut self, index: &LayerObjectIndex, create: bool) -> Option<&mut Layer> {
        let group = self.group_at(&index.group_indices, create)?;
        if index.layer_index >= group.layers.len() {
            if !create {
                return None;
            }
            group.layers.resize_with(index.layer_index + 1, Layer::new);
        }
        group.layers.get_mut(index.layer_index)
    }

    /// Place an already-built source at `index`, creating the path as needed.
    pub fn add_source(
        &mut self,
        index: &LayerObjectIndex,
        source: Box<dyn Source>,
        frame: Rect,
        rotation: f64,
    ) -> ScenecraftResult<()> {
        let layer = self
            .layer_at(index, true)
            .ok_or_else(|| ScenecraftError::validation("layer index could not be created"))?;
        layer.surfaces.push(Surface::new(source, frame, rotation));
        Ok(())
    }

    /// Load `asset` and place it at `index`.
    ///
    /// The source is built before the tree is touched, so a failure leaves the scene unchanged.
    pub fn add_asset(
        &mut self,
        ctx: &CompositingContext,
        index: &LayerObjectIndex,
        asset: &AssetSpec,
    ) -> ScenecraftResult<()> {
        let source = asset.build_source(ctx)?;
        self.add_source(index, source, asset.frame, asset.rotation)?;
        tracing::debug!(scene = %self.id, ?index, kind = source_kind(&asset.kind), "asset added");
        Ok(())
    }

    /// Render the scene at `time` seconds.
    pub fn render(
        &mut self,
        ctx: &CompositingContext,
        time: f64,
        composition_time_offset: f64,
        external: Option<&ExternalFrames>,
    ) -> Option<Raster> {
        self.group.render(ctx, time, composition_time_offset, external)
    }
}

fn source_kind(kind: &AssetKind) -> &'static str {
    match kind {
        AssetKind::Image(_) => "image",
        AssetKind::Gif { .. } => "gif",
        AssetKind::Video(_) => "video",
        AssetKind::Text(_) => "text",
    }
}

fn validate_duration(duration: f64) -> ScenecraftResult<()> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(ScenecraftError::validation(format!(
            "scene duration must be finite and >= 0, got {duration}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/scene.rs"]
mod tests;
