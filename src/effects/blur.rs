use crate::animation::animator::{FilterAnimator, PropertyValue};
use crate::effects::filter::{Filter, FilterProperty, FilterTimes, ignore_update};
use crate::foundation::error::ScenecraftResult;
use crate::render::blur::blur_rgba8_premul;
use crate::render::context::RenderSettings;
use crate::render::raster::Raster;

/// Largest kernel radius applied; larger requests are clamped.
pub const MAX_BLUR_RADIUS: u32 = 256;

/// Gaussian blur. The output extent grows by the kernel radius on every side.
#[derive(Clone, Debug)]
pub struct GaussianBlur {
    /// Kernel radius in pixels. Sigma is half the radius.
    pub radius: f64,
    animators: Vec<FilterAnimator>,
}

impl GaussianBlur {
    /// Blur with `radius` pixels.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            animators: Vec::new(),
        }
    }

    fn kernel_radius(&self) -> u32 {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return 0;
        }
        let r = self.radius.round();
        if r > f64::from(MAX_BLUR_RADIUS) {
            tracing::warn!(radius = self.radius, max = MAX_BLUR_RADIUS, "blur radius clamped");
            return MAX_BLUR_RADIUS;
        }
        r as u32
    }
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl Filter for GaussianBlur {
    fn name(&self) -> &'static str {
        "gaussian_blur"
    }

    fn animators(&self) -> &[FilterAnimator] {
        &self.animators
    }

    fn add_animator(&mut self, animator: FilterAnimator) {
        self.animators.push(animator);
    }

    fn update_property(&mut self, property: FilterProperty, value: PropertyValue) {
        match (property, value) {
            (FilterProperty::Radius, PropertyValue::Scalar(v)) => self.radius = v,
            _ => ignore_update(self.name(), property, value),
        }
    }

    fn apply(
        &mut self,
        image: &Raster,
        _times: FilterTimes,
        _settings: &RenderSettings,
    ) -> ScenecraftResult<Raster> {
        let radius = self.kernel_radius();
        if radius == 0 || image.is_empty() {
            return Ok(image.clone());
        }
        let padded = image.padded(radius)?;
        let sigma = radius as f32 / 2.0;
        let data = blur_rgba8_premul(padded.data(), padded.width(), padded.height(), radius, sigma)?;
        let (x, y) = padded.origin();
        Ok(Raster::from_premul(padded.width(), padded.height(), data)?.at(x, y))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
