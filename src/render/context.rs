use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::assets::media::FfmpegDecoderFactory;
use crate::foundation::core::Canvas;
use crate::foundation::error::ScenecraftResult;
use crate::render::buffer::PixelBuffer;
use crate::render::raster::Raster;
use crate::source::video::VideoDecoderFactory;

/// Resampling filter used when rasters are transformed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Sampling {
    /// Bilinear interpolation of the four nearest texels.
    #[default]
    Bilinear,
    /// Nearest texel.
    Nearest,
}

/// Backend-agnostic render settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderSettings {
    /// If set, output buffers are cleared to this RGBA8 (straight alpha) colour before drawing.
    pub clear_rgba: Option<[u8; 4]>,
    /// Resampling filter for surface placement and geometric filters.
    pub sampling: Sampling,
    /// Largest width or height a transformed raster may reach.
    pub max_dimension: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_rgba: None,
            sampling: Sampling::Bilinear,
            max_dimension: 16_384,
        }
    }
}

/// Long-lived compositing state shared by the renderer, sources and export drivers.
///
/// Construct one per application session and pass it around as `Arc<CompositingContext>`.
pub struct CompositingContext {
    settings: RenderSettings,
    font_dirs: Vec<PathBuf>,
    fonts: OnceLock<Arc<usvg::fontdb::Database>>,
    decoders: Arc<dyn VideoDecoderFactory>,
}

impl CompositingContext {
    /// Context with `settings`, system fonts and the ffmpeg video decoder.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            font_dirs: Vec::new(),
            fonts: OnceLock::new(),
            decoders: Arc::new(FfmpegDecoderFactory),
        }
    }

    /// Also load `.ttf`/`.otf`/`.ttc` files from `dir` when fonts are first needed.
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Replace the factory used to open video files.
    pub fn with_decoder_factory(mut self, factory: Arc<dyn VideoDecoderFactory>) -> Self {
        self.decoders = factory;
        self
    }

    /// Wrap in an `Arc` for sharing.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Render settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Video decoder factory.
    pub fn decoders(&self) -> &Arc<dyn VideoDecoderFactory> {
        &self.decoders
    }

    /// Font database for text rendering, loaded on first use.
    pub fn font_db(&self) -> Arc<usvg::fontdb::Database> {
        self.fonts
            .get_or_init(|| {
                let mut db = usvg::fontdb::Database::new();
                db.load_system_fonts();
                for dir in &self.font_dirs {
                    load_fonts_from_dir(&mut db, dir);
                }
                tracing::debug!(faces = db.len(), "font database loaded");
                Arc::new(db)
            })
            .clone()
    }

    /// Crop a rendered image to `canvas`, clearing to the configured colour first.
    pub fn to_output_buffer(
        &self,
        image: Option<&Raster>,
        canvas: Canvas,
    ) -> ScenecraftResult<PixelBuffer> {
        match image {
            Some(img) => img.to_canvas_buffer(canvas, self.settings.clear_rgba),
            None => Raster::new(0, 0, 0, 0)?.to_canvas_buffer(canvas, self.settings.clear_rgba),
        }
    }
}

impl Default for CompositingContext {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl std::fmt::Debug for CompositingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositingContext")
            .field("settings", &self.settings)
            .field("font_dirs", &self.font_dirs)
            .field("fonts_loaded", &self.fonts.get().is_some())
            .finish()
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in rd.flatten() {
        let path = entry.path();
        let is_font = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
            .unwrap_or(false);
        if is_font && db.load_font_file(&path).is_err() {
            tracing::warn!(path = %path.display(), "failed to load font file");
        }
    }
}
