use crate::animation::animator::{FilterAnimator, PropertyValue};
use crate::effects::filter::{Filter, FilterProperty, FilterTimes, ignore_update};
use crate::foundation::error::ScenecraftResult;
use crate::render::context::RenderSettings;
use crate::render::raster::Raster;

const LUMA: [f32; 3] = [0.2125, 0.7154, 0.0721];

/// Saturation, then brightness, then contrast about mid-grey, on straight colour in `0..=1`.
pub(crate) fn color_controls(
    rgb: [f32; 3],
    brightness: f32,
    contrast: f32,
    saturation: f32,
) -> [f32; 3] {
    let luma = rgb[0] * LUMA[0] + rgb[1] * LUMA[1] + rgb[2] * LUMA[2];
    rgb.map(|c| {
        let c = luma + (c - luma) * saturation;
        let c = c + brightness;
        (c - 0.5) * contrast + 0.5
    })
}

/// Brightness, contrast and saturation controls.
#[derive(Clone, Debug)]
pub struct ColorAdjustment {
    /// Added to every channel. Neutral at 0.
    pub brightness: f64,
    /// Scales distance from mid-grey. Neutral at 1.
    pub contrast: f64,
    /// Scales distance from luma. Neutral at 1; 0 is greyscale.
    pub saturation: f64,
    animators: Vec<FilterAnimator>,
}

impl ColorAdjustment {
    /// Filter with explicit settings.
    pub fn new(brightness: f64, contrast: f64, saturation: f64) -> Self {
        Self {
            brightness,
            contrast,
            saturation,
            animators: Vec::new(),
        }
    }
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        Self::new(0.0, 1.0, 1.0)
    }
}

impl Filter for ColorAdjustment {
    fn name(&self) -> &'static str {
        "color_adjustment"
    }

    fn animators(&self) -> &[FilterAnimator] {
        &self.animators
    }

    fn add_animator(&mut self, animator: FilterAnimator) {
        self.animators.push(animator);
    }

    fn update_property(&mut self, property: FilterProperty, value: PropertyValue) {
        match (property, value) {
            (FilterProperty::Brightness, PropertyValue::Scalar(v)) => self.brightness = v,
            (FilterProperty::Contrast, PropertyValue::Scalar(v)) => self.contrast = v,
            (FilterProperty::Saturation, PropertyValue::Scalar(v)) => self.saturation = v,
            _ => ignore_update(self.name(), property, value),
        }
    }

    fn apply(
        &mut self,
        image: &Raster,
        _times: FilterTimes,
        _settings: &RenderSettings,
    ) -> ScenecraftResult<Raster> {
        if self.brightness == 0.0 && self.contrast == 1.0 && self.saturation == 1.0 {
            return Ok(image.clone());
        }
        let (b, c, s) = (
            self.brightness as f32,
            self.contrast as f32,
            self.saturation as f32,
        );
        Ok(image.map_straight(|rgb| color_controls(rgb, b, c, s)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color.rs"]
mod tests;
