use crate::effects::filter::{Filter, FilterTimes};
use crate::render::context::CompositingContext;
use crate::render::raster::Raster;
use crate::scene::layer::{Layer, stack};
use crate::scene::mask::Mask;
use crate::source::ExternalFrames;

/// Recursive node of the scene tree.
///
/// Rendering draws the group's own layers, then child groups over them, then runs the filter
/// chain and finally the mask. Groups are built top-down and never re-parented.
pub struct Group {
    id: String,
    /// Child groups, drawn over this group's layers in list order.
    pub groups: Vec<Group>,
    /// Own layers, drawn first in list order.
    pub layers: Vec<Layer>,
    /// Filters applied to the combined image in list order.
    pub filters: Vec<Box<dyn Filter>>,
    /// Optional cutout applied after the filters.
    pub mask: Option<Box<dyn Mask>>,
}

impl Group {
    /// Group with no children, layers, filters or mask.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            groups: Vec::new(),
            layers: Vec::new(),
            filters: Vec::new(),
            mask: None,
        }
    }

    /// Group holding one empty layer; used when index paths grow the tree.
    pub fn with_empty_layer() -> Self {
        let mut g = Self::new();
        g.layers.push(Layer::new());
        g
    }

    /// Replace the generated identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Append a filter.
    pub fn with_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the mask.
    pub fn with_mask(mut self, mask: Box<dyn Mask>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `true` when nothing in this subtree can draw.
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.surfaces.is_empty()) && self.groups.iter().all(Group::is_empty)
    }

    /// Render this subtree at `frame_time` seconds of scene time.
    ///
    /// `composition_time_offset` is the scene's start within a multi-scene composition and only
    /// feeds filter timestamps. `external` carries buffers for externally fed video tracks.
    /// Returns `None` when nothing contributes; per-frame failures are logged and treated as
    /// absent content.
    #[tracing::instrument(level = "trace", skip(self, ctx, external), fields(group = %self.id))]
    pub fn render(
        &mut self,
        ctx: &CompositingContext,
        frame_time: f64,
        composition_time_offset: f64,
        external: Option<&ExternalFrames>,
    ) -> Option<Raster> {
        let settings = ctx.settings();
        let mut out: Option<Raster> = None;

        for layer in &mut self.layers {
            if let Some(image) = layer.render(settings, frame_time, external) {
                out = stack(out, image, settings.max_dimension);
            }
        }
        for child in &mut self.groups {
            if let Some(image) = child.render(ctx, frame_time, composition_time_offset, external) {
                out = stack(out, image, settings.max_dimension);
            }
        }

        let times = FilterTimes {
            source: None,
            scene: Some(frame_time),
            composition: Some(frame_time + composition_time_offset),
        };
        for filter in &mut self.filters {
            filter.animate(frame_time);
            let Some(image) = out.as_ref() else {
                continue;
            };
            match filter.apply(image, times, settings) {
                Ok(filtered) => out = Some(filtered),
                Err(e) => {
                    tracing::warn!(
                        group = %self.id,
                        filter = filter.name(),
                        error = %e,
                        "filter failed, dropping group output"
                    );
                    return None;
                }
            }
        }

        match &self.mask {
            Some(mask) => out.and_then(|image| mask.mask_image(&image)),
            None => out,
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/group.rs"]
mod tests;
