use std::collections::HashMap;
use std::f64::consts::TAU;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::context::{CompositingContext, RenderSettings};
use crate::render::raster::Raster;
use crate::source::frame::Frame;
use crate::source::{ExternalFrames, Source, SourceKind};

/// Horizontal placement of a text line within the text canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlignment {
    /// Flush left.
    Left,
    /// Centred.
    #[default]
    Center,
    /// Flush right.
    Right,
}

/// Visual style of rendered text. Colours are straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font family name, resolved against the context font database.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Fill colour.
    pub color: [u8; 4],
    /// Line alignment.
    pub alignment: TextAlignment,
    /// Optional full-canvas background.
    pub background: Option<[u8; 4]>,
    /// Optional outline colour.
    pub stroke: Option<[u8; 4]>,
    /// Outline width in pixels.
    pub stroke_width: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 24.0,
            color: [255, 255, 255, 255],
            alignment: TextAlignment::Center,
            background: None,
            stroke: None,
            stroke_width: 0.0,
        }
    }
}

/// Transition between consecutive text chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnimation {
    /// Hard cut at the chunk midpoint.
    #[default]
    Swap,
    /// Fade the current chunk out, then the next one in.
    FadeInOut,
    /// Current chunk leaves to the left while the next enters from the right.
    SlideLeft,
    /// Current chunk leaves to the right while the next enters from the left.
    SlideRight,
    /// Current chunk leaves upwards while the next enters from below.
    SlideUp,
    /// Current chunk leaves downwards while the next enters from above.
    SlideDown,
    /// Spin the current chunk out, then the next one in.
    RotateIn,
    /// Shrink the current chunk away, then grow the next one.
    ScaleIn,
}

/// Animated word-chunk text rendered onto a fixed-size canvas.
pub struct TextSource {
    words: Vec<String>,
    chunks: Vec<String>,
    style: TextStyle,
    canvas: Canvas,
    word_duration: f64,
    animation: TextAnimation,
    max_characters: usize,
    settings: RenderSettings,
    fonts: Arc<usvg::fontdb::Database>,
    cache: HashMap<usize, Raster>,
}

impl TextSource {
    /// Text source with default style, 1 s per chunk, swap animation and 20-character chunks.
    pub fn new(words: Vec<String>, canvas: Canvas, ctx: &CompositingContext) -> Self {
        let max_characters = 20;
        Self {
            chunks: chunk_words(&words, max_characters),
            words,
            style: TextStyle::default(),
            canvas,
            word_duration: 1.0,
            animation: TextAnimation::Swap,
            max_characters,
            settings: ctx.settings().clone(),
            fonts: ctx.font_db(),
            cache: HashMap::new(),
        }
    }

    /// Replace the style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self.cache.clear();
        self
    }

    /// Replace the transition.
    pub fn with_animation(mut self, animation: TextAnimation) -> Self {
        self.animation = animation;
        self
    }

    /// Seconds each chunk stays active. Must be positive.
    pub fn with_word_duration(mut self, secs: f64) -> ScenecraftResult<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ScenecraftError::validation(
                "text word duration must be positive",
            ));
        }
        self.word_duration = secs;
        Ok(self)
    }

    /// Character budget per chunk. Must be at least 1.
    pub fn with_max_characters(mut self, max: usize) -> ScenecraftResult<Self> {
        if max == 0 {
            return Err(ScenecraftError::validation(
                "text chunk limit must be at least 1",
            ));
        }
        self.max_characters = max;
        self.chunks = chunk_words(&self.words, max);
        self.cache.clear();
        Ok(self)
    }

    /// The chunks cycled through.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Active chunk index and progress through it at `time`.
    pub fn chunk_at(&self, time: f64) -> Option<(usize, f64)> {
        if self.chunks.is_empty() || !time.is_finite() {
            return None;
        }
        let n = self.chunks.len() as i64;
        let idx = ((time / self.word_duration).floor() as i64).rem_euclid(n) as usize;
        let progress = time.rem_euclid(self.word_duration) / self.word_duration;
        Some((idx, progress))
    }

    fn chunk_image(&mut self, idx: usize) -> ScenecraftResult<Raster> {
        if let Some(r) = self.cache.get(&idx) {
            return Ok(r.clone());
        }
        let text = self.chunks.get(idx).cloned().unwrap_or_default();
        let raster = self.render_text(&text, 1.0, Vec2::ZERO)?;
        self.cache.insert(idx, raster.clone());
        Ok(raster)
    }

    fn render_text(&self, text: &str, alpha: f64, offset: Vec2) -> ScenecraftResult<Raster> {
        let svg = text_svg(text, &self.style, self.canvas, alpha, offset);
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fonts),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| ScenecraftError::evaluation(format!("text layout failed: {e}")))?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(self.canvas.width, self.canvas.height)
            .ok_or_else(|| ScenecraftError::evaluation("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        Raster::from_premul(self.canvas.width, self.canvas.height, pixmap.data().to_vec())
    }

    /// Raster about the canvas centre.
    fn about_center(&self, raster: &Raster, xf: Affine) -> ScenecraftResult<Raster> {
        let c = Vec2::new(
            f64::from(self.canvas.width) / 2.0,
            f64::from(self.canvas.height) / 2.0,
        );
        let full = Affine::translate(c) * xf * Affine::translate(-c);
        raster.transformed(full, &self.settings)
    }

    fn render_at(&mut self, idx: usize, p: f64) -> ScenecraftResult<Raster> {
        let next = (idx + 1) % self.chunks.len();
        let (w, h) = (
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        );
        match self.animation {
            TextAnimation::Swap => self.chunk_image(if p < 0.5 { idx } else { next }),
            TextAnimation::FadeInOut => {
                let (which, alpha) = if p < 0.5 {
                    (idx, 1.0 - p * 2.0)
                } else {
                    (next, (p - 0.5) * 2.0)
                };
                let text = self.chunks[which].clone();
                self.render_text(&text, alpha, Vec2::ZERO)
            }
            TextAnimation::SlideLeft
            | TextAnimation::SlideRight
            | TextAnimation::SlideUp
            | TextAnimation::SlideDown => {
                let (cur_off, next_off) = match self.animation {
                    TextAnimation::SlideLeft => {
                        (Vec2::new(-w * p, 0.0), Vec2::new(w * (1.0 - p), 0.0))
                    }
                    TextAnimation::SlideRight => {
                        (Vec2::new(w * p, 0.0), Vec2::new(-w * (1.0 - p), 0.0))
                    }
                    TextAnimation::SlideUp => {
                        (Vec2::new(0.0, -h * p), Vec2::new(0.0, h * (1.0 - p)))
                    }
                    _ => (Vec2::new(0.0, h * p), Vec2::new(0.0, -h * (1.0 - p))),
                };
                let cur_text = self.chunks[idx].clone();
                let next_text = self.chunks[next].clone();
                let current = self.render_text(&cur_text, 1.0, cur_off)?;
                let incoming = self.render_text(&next_text, 1.0, next_off)?;
                incoming.composited_over(&current, self.settings.max_dimension)
            }
            TextAnimation::RotateIn => {
                let (which, angle) = if p < 0.5 {
                    (idx, p * TAU)
                } else {
                    (next, (p - 0.5) * TAU)
                };
                let img = self.chunk_image(which)?;
                self.about_center(&img, Affine::rotate(angle))
            }
            TextAnimation::ScaleIn => {
                let (which, scale) = if p < 0.5 {
                    (idx, 1.0 - p * 2.0)
                } else {
                    (next, (p - 0.5) * 2.0)
                };
                let img = self.chunk_image(which)?;
                self.about_center(&img, Affine::scale(scale))
            }
        }
    }
}

impl Source for TextSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Text
    }

    fn frame_at(&mut self, time: f64, _external: Option<&ExternalFrames>) -> Option<Frame> {
        let (idx, progress) = self.chunk_at(time)?;
        let rendered = self
            .render_at(idx, progress)
            .and_then(|r| r.to_canvas_buffer(self.canvas, None))
            .and_then(|buf| Raster::from_pixel_buffer(&buf));
        match rendered {
            Ok(raster) => Some(Frame::from_raster(raster, Some(time))),
            Err(e) => {
                tracing::warn!(error = %e, time, "text frame failed");
                None
            }
        }
    }
}

/// Greedily pack words into chunks of at most `max_characters` characters.
///
/// A word longer than the limit is truncated when it would start a chunk on its own.
pub fn chunk_words(words: &[String], max_characters: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in words {
        let candidate = if current.is_empty() {
            word.clone()
        } else {
            format!("{current} {word}")
        };
        if candidate.chars().count() <= max_characters {
            current = candidate;
        } else if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current = word.clone();
        } else {
            current = word.chars().take(max_characters).collect();
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn text_svg(text: &str, style: &TextStyle, canvas: Canvas, alpha: f64, offset: Vec2) -> String {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let (x, anchor) = match style.alignment {
        TextAlignment::Left => (0.0, "start"),
        TextAlignment::Center => (w / 2.0, "middle"),
        TextAlignment::Right => (w, "end"),
    };
    let alpha = alpha.clamp(0.0, 1.0);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    if let Some(bg) = style.background {
        let _ = write!(
            svg,
            r#"<rect x="0" y="0" width="{w}" height="{h}" fill="{}" fill-opacity="{}"/>"#,
            css_rgb(bg),
            f64::from(bg[3]) / 255.0
        );
    }
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" font-family="{}" font-size="{}" text-anchor="{anchor}" dominant-baseline="central" fill="{}" fill-opacity="{}""#,
        x + offset.x,
        h / 2.0 + offset.y,
        xml_escape(&style.font_family),
        style.font_size,
        css_rgb(style.color),
        f64::from(style.color[3]) / 255.0 * alpha,
    );
    if let Some(stroke) = style.stroke
        && style.stroke_width > 0.0
    {
        let _ = write!(
            svg,
            r#" stroke="{}" stroke-opacity="{}" stroke-width="{}""#,
            css_rgb(stroke),
            f64::from(stroke[3]) / 255.0 * alpha,
            style.stroke_width
        );
    }
    let _ = write!(svg, ">{}</text></svg>", xml_escape(text));
    svg
}

fn css_rgb(c: [u8; 4]) -> String {
    format!("rgb({},{},{})", c[0], c[1], c[2])
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/source/text.rs"]
mod tests;
