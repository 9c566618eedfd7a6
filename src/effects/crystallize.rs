use crate::animation::animator::{FilterAnimator, PropertyValue};
use crate::effects::filter::{Filter, FilterProperty, FilterTimes, ignore_update};
use crate::foundation::core::Point;
use crate::foundation::error::ScenecraftResult;
use crate::foundation::math::cell_noise;
use crate::render::context::RenderSettings;
use crate::render::raster::Raster;

const JITTER_SEED_X: u64 = 0x6372_7973_7461_6c78;
const JITTER_SEED_Y: u64 = 0x6372_7973_7461_6c79;

/// Flat-coloured polygonal cells.
///
/// Cells lie on a grid of `radius` pixels anchored at `center`; each cell's seed is jittered
/// deterministically and every pixel takes the colour under its nearest seed.
#[derive(Clone, Debug)]
pub struct Crystallize {
    /// Cell size in pixels.
    pub radius: f64,
    /// Grid anchor in canvas pixels.
    pub center: Point,
    animators: Vec<FilterAnimator>,
}

impl Crystallize {
    /// Filter with explicit settings.
    pub fn new(radius: f64, center: Point) -> Self {
        Self {
            radius,
            center,
            animators: Vec::new(),
        }
    }

    fn seed(&self, i: i64, j: i64) -> Point {
        let r = self.radius;
        Point::new(
            self.center.x + (i as f64 + cell_noise(JITTER_SEED_X, i, j)) * r,
            self.center.y + (j as f64 + cell_noise(JITTER_SEED_Y, i, j)) * r,
        )
    }
}

impl Default for Crystallize {
    fn default() -> Self {
        Self::new(20.0, Point::new(150.0, 150.0))
    }
}

impl Filter for Crystallize {
    fn name(&self) -> &'static str {
        "crystallize"
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
            (FilterProperty::CenterPoint, PropertyValue::Point(p)) => self.center = p,
            _ => ignore_update(self.name(), property, value),
        }
    }

    fn apply(
        &mut self,
        image: &Raster,
        _times: FilterTimes,
        _settings: &RenderSettings,
    ) -> ScenecraftResult<Raster> {
        if !self.radius.is_finite() || self.radius < 1.0 || image.is_empty() {
            return Ok(image.clone());
        }
        let (ox, oy) = image.origin();
        let r = self.radius;
        Ok(image.map_positions(|x, y| {
            let px = f64::from(ox) + f64::from(x) + 0.5;
            let py = f64::from(oy) + f64::from(y) + 0.5;
            let ci = ((px - self.center.x) / r).floor() as i64;
            let cj = ((py - self.center.y) / r).floor() as i64;

            let mut best = self.seed(ci, cj);
            let mut best_d = f64::INFINITY;
            for dj in -1..=1 {
                for di in -1..=1 {
                    let s = self.seed(ci + di, cj + dj);
                    let d = (s - Point::new(px, py)).hypot2();
                    if d < best_d {
                        best_d = d;
                        best = s;
                    }
                }
            }
            let sx = (best.x - f64::from(ox)).floor() as i64;
            let sy = (best.y - f64::from(oy)).floor() as i64;
            image.clamped_local(sx, sy)
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/crystallize.rs"]
mod tests;
