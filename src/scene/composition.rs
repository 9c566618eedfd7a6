use crate::foundation::core::Canvas;
use crate::scene::scene::{Scene, TransitionKind};

/// Container the composition is exported to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// MP4 video.
    #[default]
    Video,
    /// Animated GIF.
    Gif,
}

/// A scene visible at some composition time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveScene {
    /// Position in [`Composition::scenes`].
    pub index: usize,
    /// Scene start within the composition.
    pub start: f64,
    /// Time within the scene.
    pub local_time: f64,
    /// Opacity from an incoming fade; 1 outside transitions.
    pub opacity: f64,
}

/// Ordered scenes plus export target parameters.
pub struct Composition {
    id: String,
    /// Scenes in play order.
    pub scenes: Vec<Scene>,
    /// Output size.
    pub render_size: Canvas,
    /// Output container.
    pub output: OutputKind,
}

impl Composition {
    /// Composition of `scenes` rendered at `render_size`.
    pub fn new(scenes: Vec<Scene>, render_size: Canvas, output: OutputKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scenes,
            render_size,
            output,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Start offset of every scene.
    ///
    /// Each scene starts where the previous one ends minus the previous scene's transition
    /// duration, so transitions overlap adjacent scenes.
    pub fn timeline(&self) -> Vec<f64> {
        let mut starts = Vec::with_capacity(self.scenes.len());
        let mut t = 0.0;
        for scene in &self.scenes {
            starts.push(t);
            t = t + scene.duration() - scene.transition().duration;
        }
        starts
    }

    /// End of the last scene to finish.
    pub fn duration(&self) -> f64 {
        self.timeline()
            .iter()
            .zip(&self.scenes)
            .map(|(start, scene)| start + scene.duration())
            .fold(0.0, f64::max)
    }

    /// Scenes covering `time`, bottom first.
    ///
    /// A scene entering during its predecessor's fade transition gets the fade progress as
    /// opacity.
    pub fn active_at(&self, time: f64) -> Vec<ActiveScene> {
        let starts = self.timeline();
        let mut active = Vec::new();
        for (index, (scene, &start)) in self.scenes.iter().zip(&starts).enumerate() {
            let local_time = time - start;
            if local_time < 0.0 || local_time >= scene.duration() {
                continue;
            }
            let mut opacity = 1.0;
            if let Some(prev) = index.checked_sub(1).map(|i| &self.scenes[i]) {
                let tr = prev.transition();
                if tr.kind == TransitionKind::Fade && tr.duration > 0.0 && local_time < tr.duration {
                    opacity = local_time / tr.duration;
                }
            }
            active.push(ActiveScene {
                index,
                start,
                local_time,
                opacity,
            });
        }
        active
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composition.rs"]
mod tests;
