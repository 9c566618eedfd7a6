use std::path::PathBuf;

use crate::foundation::core::Size;
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::scene::group::Group;
use crate::scene::scene::Scene;
use crate::source::TrackId;

const SEGMENT_EPSILON: f64 = 1e-9;

/// How an externally fed clip behaves once the scene outlasts it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalLoopPolicy {
    /// Repeat the clip from the start.
    #[default]
    Loop,
    /// Play the clip once and keep showing its last frame.
    HoldLast,
}

/// A video source switched to external feeding, with what the engine needs to supply it.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackAssignment {
    /// Track the source now reads from.
    pub track_id: TrackId,
    /// Clip file, when known.
    pub path: Option<PathBuf>,
    /// Clip duration in seconds.
    pub duration: f64,
    /// Encoded clip size.
    pub natural_size: Size,
}

/// Number every self-managed video source in `scene` and switch it to external feeding.
///
/// Tracks are numbered from 1 in render order: a group's layers first, then its child groups.
pub fn assign_track_ids(scene: &mut Scene) -> Vec<TrackAssignment> {
    let mut out = Vec::new();
    let mut next = 1;
    assign_in_group(scene.group_mut(), &mut next, &mut out);
    tracing::debug!(scene = %scene.id(), tracks = out.len(), "video tracks assigned");
    out
}

fn assign_in_group(group: &mut Group, next: &mut i32, out: &mut Vec<TrackAssignment>) {
    for layer in &mut group.layers {
        for surface in &mut layer.surfaces {
            let Some(video) = surface.source_mut().as_video_mut() else {
                continue;
            };
            if !video.is_self_managed() {
                continue;
            }
            let track_id = TrackId(*next);
            *next += 1;
            out.push(TrackAssignment {
                track_id,
                path: video.info().path.clone(),
                duration: video.info().duration,
                natural_size: video.natural_size(),
            });
            video.feed_externally(track_id);
        }
    }
    for child in &mut group.groups {
        assign_in_group(child, next, out);
    }
}

/// What a planned track plays.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackContent {
    /// A clip previously assigned to a video source.
    Clip(TrackAssignment),
    /// Blank frames, planned when the scene has no video so the engine still drives rendering.
    Blank,
}

/// Clip time range placed on the composition timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsertSegment {
    /// Composition time the segment starts at.
    pub at: f64,
    /// Clip time the segment starts from.
    pub source_start: f64,
    /// Segment length in seconds.
    pub duration: f64,
}

/// One track of a [`TrackPlan`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedTrack {
    /// Track identifier.
    pub track_id: TrackId,
    /// What plays on the track.
    pub content: TrackContent,
    /// Inserts covering the scene duration.
    pub segments: Vec<InsertSegment>,
}

/// Per-track insert schedule for driving a scene from an external compositing engine.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackPlan {
    duration: f64,
    policy: ExternalLoopPolicy,
    tracks: Vec<PlannedTrack>,
}

impl TrackPlan {
    /// Plan `assignments` over the duration of `scene`.
    pub fn build(
        scene: &Scene,
        assignments: &[TrackAssignment],
        policy: ExternalLoopPolicy,
    ) -> ScenecraftResult<Self> {
        let duration = scene.duration();
        let mut tracks = Vec::with_capacity(assignments.len().max(1));

        if assignments.is_empty() {
            tracks.push(PlannedTrack {
                track_id: TrackId(1),
                content: TrackContent::Blank,
                segments: vec![InsertSegment {
                    at: 0.0,
                    source_start: 0.0,
                    duration,
                }],
            });
        }

        for assignment in assignments {
            let clip = assignment.duration;
            if !clip.is_finite() || clip <= 0.0 {
                return Err(ScenecraftError::validation(format!(
                    "video track {} has no usable duration ({clip})",
                    assignment.track_id
                )));
            }
            let segments = match policy {
                ExternalLoopPolicy::Loop => loop_segments(clip, duration),
                ExternalLoopPolicy::HoldLast => vec![InsertSegment {
                    at: 0.0,
                    source_start: 0.0,
                    duration: clip.min(duration),
                }],
            };
            tracks.push(PlannedTrack {
                track_id: assignment.track_id,
                content: TrackContent::Clip(assignment.clone()),
                segments,
            });
        }

        Ok(Self {
            duration,
            policy,
            tracks,
        })
    }

    /// Scene duration the plan covers.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Loop policy the plan was built with.
    pub fn policy(&self) -> ExternalLoopPolicy {
        self.policy
    }

    /// Planned tracks in track-id order.
    pub fn tracks(&self) -> &[PlannedTrack] {
        &self.tracks
    }

    /// Identifiers of every planned track, the `required_track_ids` of a render request.
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.track_id).collect()
    }

    /// Clip time shown on `track` at `composition_time`, or `None` outside the plan.
    pub fn source_time(&self, track: TrackId, composition_time: f64) -> Option<f64> {
        if !(0.0..self.duration).contains(&composition_time) {
            return None;
        }
        let planned = self.tracks.iter().find(|t| t.track_id == track)?;
        match &planned.content {
            TrackContent::Blank => Some(composition_time),
            TrackContent::Clip(clip) => Some(match self.policy {
                ExternalLoopPolicy::Loop => composition_time.rem_euclid(clip.duration),
                ExternalLoopPolicy::HoldLast => composition_time.min(clip.duration),
            }),
        }
    }
}

fn loop_segments(clip: f64, duration: f64) -> Vec<InsertSegment> {
    let mut segments = Vec::new();
    let mut at = 0.0;
    while duration - at > SEGMENT_EPSILON {
        let len = clip.min(duration - at);
        segments.push(InsertSegment {
            at,
            source_start: 0.0,
            duration: len,
        });
        at += len;
    }
    segments
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/tracks.rs"]
mod tests;
