use std::fmt::Debug;

use crate::animation::animator::{FilterAnimator, PropertyValue};
use crate::foundation::error::ScenecraftResult;
use crate::render::context::RenderSettings;
use crate::render::raster::Raster;

/// Animatable filter properties.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterProperty {
    /// Blur or cell radius in pixels.
    Radius,
    /// Uniform scale factor.
    Scale,
    /// Rotation in radians.
    Rotation,
    /// Offset in pixels.
    Translation,
    /// Pivot or anchor point in canvas pixels.
    CenterPoint,
    /// Alpha multiplier.
    Fade,
    /// Additive brightness.
    Brightness,
    /// Contrast factor around mid-grey.
    Contrast,
    /// Saturation factor.
    Saturation,
    /// Effect strength.
    Intensity,
}

/// Optional timestamps handed to a filter alongside the image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FilterTimes {
    /// Time within the source media.
    pub source: Option<f64>,
    /// Time within the scene.
    pub scene: Option<f64>,
    /// Time within the whole composition.
    pub composition: Option<f64>,
}

/// Stateful image transform with animatable properties.
///
/// [`Filter::animate`] mutates property state in place, so a filter instance belongs to one
/// render at a time.
pub trait Filter: Send + Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Attached animators.
    fn animators(&self) -> &[FilterAnimator];

    /// Attach an animator. It is evaluated before every [`Filter::apply`] during rendering.
    fn add_animator(&mut self, animator: FilterAnimator);

    /// Set a property. Properties this filter does not have, or values of the wrong kind,
    /// are ignored.
    fn update_property(&mut self, property: FilterProperty, value: PropertyValue);

    /// Produce the filtered image.
    fn apply(
        &mut self,
        image: &Raster,
        times: FilterTimes,
        settings: &RenderSettings,
    ) -> ScenecraftResult<Raster>;

    /// Evaluate every animator at `time` and push the values into the property state.
    fn animate(&mut self, time: f64) {
        let values: Vec<_> = self
            .animators()
            .iter()
            .map(|a| (a.property(), a.value_at(time)))
            .collect();
        for (property, value) in values {
            self.update_property(property, value);
        }
    }
}

pub(crate) fn ignore_update(filter: &str, property: FilterProperty, value: PropertyValue) {
    tracing::debug!(filter, ?property, ?value, "ignoring property update");
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
