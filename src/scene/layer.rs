use crate::render::context::RenderSettings;
use crate::render::raster::Raster;
use crate::scene::surface::Surface;
use crate::source::ExternalFrames;

/// Ordered stack of surfaces; later surfaces draw on top.
pub struct Layer {
    id: String,
    /// Surfaces in draw order.
    pub surfaces: Vec<Surface>,
}

impl Layer {
    /// Layer with no surfaces.
    pub fn new() -> Self {
        Self::with_surfaces(Vec::new())
    }

    /// Layer holding `surfaces`.
    pub fn with_surfaces(surfaces: Vec<Surface>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            surfaces,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Composite every surface at `time`. Surfaces that produce nothing are skipped.
    pub fn render(
        &mut self,
        settings: &RenderSettings,
        time: f64,
        external: Option<&ExternalFrames>,
    ) -> Option<Raster> {
        let mut out: Option<Raster> = None;
        for surface in &mut self.surfaces {
            let Some(image) = surface.render(settings, time, external) else {
                tracing::debug!(layer = %self.id, surface = %surface.id(), time, "surface skipped");
                continue;
            };
            out = stack(out, image, settings.max_dimension);
        }
        out
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw `top` over the accumulated image. When the combined extent would exceed
/// `max_dimension`, `top` is dropped and the accumulated image kept.
pub(crate) fn stack(acc: Option<Raster>, top: Raster, max_dimension: u32) -> Option<Raster> {
    let Some(below) = acc else {
        return Some(top);
    };
    match top.composited_over(&below, max_dimension) {
        Ok(out) => Some(out),
        Err(e) => {
            tracing::warn!(error = %e, "composite failed, keeping image below");
            Some(below)
        }
    }
}
