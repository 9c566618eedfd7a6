use crate::foundation::core::{Affine, Rect, Size, Vec2};
use crate::render::context::RenderSettings;
use crate::render::raster::Raster;
use crate::source::{ExternalFrames, Source};

/// Placement of one source inside a layer: a target rect plus a rotation in radians.
pub struct Surface {
    id: String,
    source: Box<dyn Source>,
    frame: Rect,
    rotation: f64,
}

impl Surface {
    /// Place `source` so its frames fill `frame`, rotated by `rotation`.
    pub fn new(source: Box<dyn Source>, frame: Rect, rotation: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source,
            frame,
            rotation,
        }
    }

    /// Replace the generated identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target rectangle in canvas pixels.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// The placed source.
    pub fn source(&self) -> &dyn Source {
        self.source.as_ref()
    }

    /// The placed source, mutably.
    pub fn source_mut(&mut self) -> &mut dyn Source {
        self.source.as_mut()
    }

    /// Affine taking an image of `image_size` (anchored at the origin) into the target rect.
    ///
    /// The image is centred on the origin, rotated, scaled independently on x and y to the
    /// rect size, then moved to the rect centre. Returns `None` for an empty image.
    pub fn placement(&self, image_size: Size) -> Option<Affine> {
        if image_size.width <= 0.0 || image_size.height <= 0.0 {
            return None;
        }
        let sx = self.frame.width() / image_size.width;
        let sy = self.frame.height() / image_size.height;
        let center = Vec2::new(image_size.width / 2.0, image_size.height / 2.0);
        Some(
            Affine::translate(self.frame.center().to_vec2())
                * Affine::scale_non_uniform(sx, sy)
                * Affine::rotate(self.rotation)
                * Affine::translate(-center),
        )
    }

    /// Source frame at `time`, placed in canvas space. `None` when there is nothing to draw.
    pub fn render(
        &mut self,
        settings: &RenderSettings,
        time: f64,
        external: Option<&ExternalFrames>,
    ) -> Option<Raster> {
        let frame = self.source.frame_at(time, external)?;
        let image = match frame.to_raster() {
            Ok(img) => img,
            Err(e) => {
                tracing::debug!(surface = %self.id, error = %e, "frame conversion failed");
                return None;
            }
        };
        let xf = self.placement(image.size())?;
        match image.transformed(xf, settings) {
            Ok(placed) => Some(placed),
            Err(e) => {
                tracing::warn!(surface = %self.id, error = %e, "surface placement failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/surface.rs"]
mod tests;
