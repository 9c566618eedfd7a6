use crate::foundation::core::Rect;
use crate::render::raster::Raster;

/// Post-filter cutout applied to a group's output.
pub trait Mask: Send {
    /// Masked image, or `None` to drop the contribution.
    fn mask_image(&self, image: &Raster) -> Option<Raster>;
}

/// Keeps pixels whose centres fall inside `rect` (canvas pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectMask {
    /// Visible region.
    pub rect: Rect,
}

impl RectMask {
    /// Mask showing only `rect`.
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Mask for RectMask {
    fn mask_image(&self, image: &Raster) -> Option<Raster> {
        let r = self.rect.abs();
        if r.area() <= 0.0 || r.intersect(image.extent()).area() <= 0.0 {
            return None;
        }
        Some(image.masked(|x, y| {
            let (cx, cy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
            cx >= r.x0 && cx < r.x1 && cy >= r.y0 && cy < r.y1
        }))
    }
}
