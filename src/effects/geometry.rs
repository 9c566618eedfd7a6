use crate::animation::animator::{FilterAnimator, PropertyValue};
use crate::effects::filter::{Filter, FilterProperty, FilterTimes, ignore_update};
use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::error::ScenecraftResult;
use crate::render::context::RenderSettings;
use crate::render::raster::Raster;

fn about(center: Point, xf: Affine) -> Affine {
    Affine::translate(center.to_vec2()) * xf * Affine::translate(-center.to_vec2())
}

/// Alpha multiplier.
#[derive(Clone, Debug)]
pub struct Fade {
    /// 1 keeps the image, 0 removes it.
    pub fade: f64,
    animators: Vec<FilterAnimator>,
}

impl Fade {
    /// Fade at `fade` opacity.
    pub fn new(fade: f64) -> Self {
        Self {
            fade,
            animators: Vec::new(),
        }
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Filter for Fade {
    fn name(&self) -> &'static str {
        "fade"
    }

    fn animators(&self) -> &[FilterAnimator] {
        &self.animators
    }

    fn add_animator(&mut self, animator: FilterAnimator) {
        self.animators.push(animator);
    }

    fn update_property(&mut self, property: FilterProperty, value: PropertyValue) {
        match (property, value) {
            (FilterProperty::Fade, PropertyValue::Scalar(v)) => self.fade = v,
            _ => ignore_update(self.name(), property, value),
        }
    }

    fn apply(
        &mut self,
        image: &Raster,
        _times: FilterTimes,
        _settings: &RenderSettings,
    ) -> ScenecraftResult<Raster> {
        let fade = if self.fade.is_finite() { self.fade } else { 0.0 };
        Ok(image.with_opacity(fade))
    }
}

/// Rotation about a pivot.
#[derive(Clone, Debug)]
pub struct Rotate {
    /// Angle in radians.
    pub rotation: f64,
    /// Pivot in canvas pixels.
    pub center: Point,
    animators: Vec<FilterAnimator>,
}

impl Rotate {
    /// Rotate by `rotation` radians about `center`.
    pub fn new(rotation: f64, center: Point) -> Self {
        Self {
            rotation,
            center,
            animators: Vec::new(),
        }
    }
}

impl Default for Rotate {
    fn default() -> Self {
        Self::new(0.0, Point::ZERO)
    }
}

impl Filter for Rotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn animators(&self) -> &[FilterAnimator] {
        &self.animators
    }

    fn add_animator(&mut self, animator: FilterAnimator) {
        self.animators.push(animator);
    }

    fn update_property(&mut self, property: FilterProperty, value: PropertyValue) {
        match (property, value) {
            (FilterProperty::Rotation, PropertyValue::Scalar(v)) => self.rotation = v,
            (FilterProperty::CenterPoint, PropertyValue::Point(p)) => self.center = p,
            _ => ignore_update(self.name(), property, value),
        }
    }

    fn apply(
        &mut self,
        image: &Raster,
        _times: FilterTimes,
        settings: &RenderSettings,
    ) -> ScenecraftResult<Raster> {
        if self.rotation == 0.0 {
            return Ok(image.clone());
        }
        image.transformed(about(self.center, Affine::rotate(self.rotation)), settings)
    }
}

/// Uniform scale about a pivot.
#[derive(Clone, Debug)]
pub struct Scale {
    /// Scale factor. Zero collapses the image.
    pub scale: f64,
    /// Pivot in canvas pixels.
    pub center: Point,
    animators: Vec<FilterAnimator>,
}

impl Scale {
    /// Scale by `scale` about `center`.
    pub fn new(scale: f64, center: Point) -> Self {
        Self {
            scale,
            center,
            animators: Vec::new(),
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::new(1.0, Point::ZERO)
    }
}

impl Filter for Scale {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn animators(&self) -> &[FilterAnimator] {
        &self.animators
    }

    fn add_animator(&mut self, animator: FilterAnimator) {
        self.animators.push(animator);
    }

    fn update_property(&mut self, property: FilterProperty, value: PropertyValue) {
        match (property, value) {
            (FilterProperty::Scale, PropertyValue::Scalar(v)) => self.scale = v,
            (FilterProperty::CenterPoint, PropertyValue::Point(p)) => self.center = p,
            _ => ignore_update(self.name(), property, value),
        }
    }

    fn apply(
        &mut self,
        image: &Raster,
        _times: FilterTimes,
        settings: &RenderSettings,
    ) -> ScenecraftResult<Raster> {
        if self.scale == 1.0 {
            return Ok(image.clone());
        }
        image.transformed(about(self.center, Affine::scale(self.scale)), settings)
    }
}

/// Offset in canvas pixels.
#[derive(Clone, Debug)]
pub struct Translate {
    /// Offset; positive y moves down.
    pub translation: Vec2,
    animators: Vec<FilterAnimator>,
}

impl Translate {
    /// Move by `translation`.
    pub fn new(translation: Vec2) -> Self {
        Self {
            translation,
            animators: Vec::new(),
        }
    }
}

impl Default for Translate {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Filter for Translate {
    fn name(&self) -> &'static str {
        "translate"
    }

    fn animators(&self) -> &[FilterAnimator] {
        &self.animators
    }

    fn add_animator(&mut self, animator: FilterAnimator) {
        self.animators.push(animator);
    }

    fn update_property(&mut self, property: FilterProperty, value: PropertyValue) {
        match (property, value) {
            (FilterProperty::Translation, PropertyValue::Point(p)) => {
                self.translation = p.to_vec2();
            }
            _ => ignore_update(self.name(), property, value),
        }
    }

    fn apply(
        &mut self,
        image: &Raster,
        _times: FilterTimes,
        settings: &RenderSettings,
    ) -> ScenecraftResult<Raster> {
        image.transformed(Affine::translate(self.translation), settings)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/geometry.rs"]
mod tests;
