use crate::animation::animator::{FilterAnimator, PropertyValue};
use crate::effects::color::color_controls;
use crate::effects::filter::{Filter, FilterProperty, FilterTimes, ignore_update};
use crate::foundation::error::ScenecraftResult;
use crate::foundation::math::cell_noise;
use crate::render::context::RenderSettings;
use crate::render::raster::Raster;

const BAND_HEIGHT: u32 = 8;
const MAX_SHIFT_PX: f64 = 12.0;
const TICKS_PER_SEC: f64 = 12.0;
const BAND_SEED: u64 = 0x676c_6974_6368;

/// Stylised digital glitch: boosted colour, pixellation, then banded RGB channel split.
///
/// Displacement is a pure function of the band index and the scene time quantized to
/// 1/12 s, so the same frame always glitches the same way.
#[derive(Clone, Debug)]
pub struct Glitch {
    /// Effect strength; 0 keeps colour boosts and the minimum pixellation only.
    pub intensity: f64,
    animators: Vec<FilterAnimator>,
}

impl Glitch {
    /// Glitch at `intensity`.
    pub fn new(intensity: f64) -> Self {
        Self {
            intensity,
            animators: Vec::new(),
        }
    }

    fn pixel_size(&self) -> u32 {
        (5.0 + self.intensity * 10.0).round().max(1.0) as u32
    }
}

impl Default for Glitch {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn pixellate(image: &Raster, cell: u32) -> Raster {
    if cell <= 1 {
        return image.clone();
    }
    let (ox, oy) = image.origin();
    let cell_i = i64::from(cell);
    image.map_positions(|x, y| {
        let cx = i64::from(ox) + i64::from(x);
        let cy = i64::from(oy) + i64::from(y);
        let sx = cx.div_euclid(cell_i) * cell_i + cell_i / 2 - i64::from(ox);
        let sy = cy.div_euclid(cell_i) * cell_i + cell_i / 2 - i64::from(oy);
        image.clamped_local(sx, sy)
    })
}

fn channel_split(image: &Raster, intensity: f64, tick: i64) -> Raster {
    if intensity <= 0.0 {
        return image.clone();
    }
    let (ox, oy) = image.origin();
    image.map_positions(|x, y| {
        let band = (i64::from(oy) + i64::from(y)).div_euclid(i64::from(BAND_HEIGHT));
        let jitter = cell_noise(BAND_SEED, band, tick) * 2.0 - 1.0;
        let shift = (jitter * intensity * MAX_SHIFT_PX).round() as i64;
        let lx = i64::from(x);
        let ly = i64::from(y);
        let red = image.pixel_at((i64::from(ox) + lx + shift) as i32, oy + y as i32);
        let green = image.clamped_local(lx, ly);
        let blue = image.pixel_at((i64::from(ox) + lx - shift) as i32, oy + y as i32);
        let alpha = red[3].max(green[3]).max(blue[3]);
        [red[0], green[1], blue[2], alpha]
    })
}

impl Filter for Glitch {
    fn name(&self) -> &'static str {
        "glitch"
    }

    fn animators(&self) -> &[FilterAnimator] {
        &self.animators
    }

    fn add_animator(&mut self, animator: FilterAnimator) {
        self.animators.push(animator);
    }

    fn update_property(&mut self, property: FilterProperty, value: PropertyValue) {
        match (property, value) {
            (FilterProperty::Intensity, PropertyValue::Scalar(v)) => self.intensity = v,
            _ => ignore_update(self.name(), property, value),
        }
    }

    fn apply(
        &mut self,
        image: &Raster,
        times: FilterTimes,
        _settings: &RenderSettings,
    ) -> ScenecraftResult<Raster> {
        if image.is_empty() {
            return Ok(image.clone());
        }
        let i = if self.intensity.is_finite() {
            self.intensity.max(0.0)
        } else {
            0.0
        };
        let saturation = (1.5 + i * 0.5) as f32;
        let contrast = (1.0 + i * 0.2) as f32;
        let boosted = image.map_straight(|rgb| color_controls(rgb, 0.0, contrast, saturation));
        let blocky = pixellate(&boosted, self.pixel_size());
        let tick = times
            .scene
            .or(times.composition)
            .or(times.source)
            .map_or(0, |t| (t * TICKS_PER_SEC).floor() as i64);
        Ok(channel_split(&blocky, i, tick))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/glitch.rs"]
mod tests;
