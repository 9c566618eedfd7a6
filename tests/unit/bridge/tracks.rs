use super::*;
use crate::foundation::core::{Affine, Fps, Rect};
use crate::render::buffer::PixelBuffer;
use crate::scene::scene::LayerObjectIndex;
use crate::source::Source;
use crate::source::video::{VideoDecoder, VideoInfo, VideoSource};

struct ClipDecoder {
    info: VideoInfo,
    cursor: u32,
}

impl VideoDecoder for ClipDecoder {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> ScenecraftResult<Option<(PixelBuffer, f64)>> {
        if self.cursor >= 2 {
            return Ok(None);
        }
        let t = f64::from(self.cursor) * 0.5;
        self.cursor += 1;
        Ok(Some((PixelBuffer::transparent(2, 2)?, t)))
    }

    fn restart(&mut self) -> ScenecraftResult<()> {
        self.cursor = 0;
        Ok(())
    }
}

fn info(name: &str, duration: f64) -> VideoInfo {
    VideoInfo {
        path: Some(PathBuf::from(name)),
        duration,
        frame_rate: 2.0,
        natural_size: Size::new(64.0, 36.0),
        transform: Affine::IDENTITY,
    }
}

fn clip(name: &str, duration: f64) -> Box<dyn Source> {
    let decoder = ClipDecoder {
        info: info(name, duration),
        cursor: 0,
    };
    Box::new(VideoSource::open(Box::new(decoder)).unwrap())
}

fn rect() -> Rect {
    Rect::new(0.0, 0.0, 10.0, 10.0)
}

fn scene(duration: f64) -> Scene {
    Scene::new(duration, Fps::new(10, 1).unwrap()).unwrap()
}

#[test]
fn tracks_are_numbered_layers_first_then_child_groups() {
    let mut s = scene(5.0);
    s.add_source(&LayerObjectIndex::new(vec![], 0), clip("a.mp4", 2.0), rect(), 0.0)
        .unwrap();
    s.add_source(&LayerObjectIndex::new(vec![0], 0), clip("b.mp4", 3.0), rect(), 0.0)
        .unwrap();
    s.add_source(&LayerObjectIndex::new(vec![], 1), clip("c.mp4", 4.0), rect(), 0.0)
        .unwrap();
    s.add_source(
        &LayerObjectIndex::new(vec![], 1),
        Box::new(VideoSource::external(TrackId(99), info("x.mp4", 1.0))),
        rect(),
        0.0,
    )
    .unwrap();

    let assigned = assign_track_ids(&mut s);
    let names: Vec<_> = assigned
        .iter()
        .map(|a| (a.track_id, a.path.clone().unwrap()))
        .collect();
    assert_eq!(
        names,
        vec![
            (TrackId(1), PathBuf::from("a.mp4")),
            (TrackId(2), PathBuf::from("c.mp4")),
            (TrackId(3), PathBuf::from("b.mp4")),
        ]
    );
    assert_eq!(assigned[0].duration, 2.0);
    assert_eq!(assigned[0].natural_size, Size::new(64.0, 36.0));

    let root_layer = &s.group().layers[0];
    let video = root_layer.surfaces[0].source().as_video().unwrap();
    assert!(!video.is_self_managed());
    assert_eq!(video.track_id(), Some(TrackId(1)));

    // A second pass finds nothing left to convert.
    assert!(assign_track_ids(&mut s).is_empty());
}

#[test]
fn loop_policy_repeats_the_clip_over_the_scene() {
    let mut s = scene(5.0);
    s.add_source(&LayerObjectIndex::new(vec![], 0), clip("a.mp4", 2.0), rect(), 0.0)
        .unwrap();
    let assigned = assign_track_ids(&mut s);
    let plan = TrackPlan::build(&s, &assigned, ExternalLoopPolicy::Loop).unwrap();

    let segments = &plan.tracks()[0].segments;
    let starts: Vec<f64> = segments.iter().map(|g| g.at).collect();
    let lens: Vec<f64> = segments.iter().map(|g| g.duration).collect();
    assert_eq!(starts, vec![0.0, 2.0, 4.0]);
    assert_eq!(lens, vec![2.0, 2.0, 1.0]);

    assert_eq!(plan.source_time(TrackId(1), 4.5), Some(0.5));
    assert_eq!(plan.source_time(TrackId(1), 1.5), Some(1.5));
    assert_eq!(plan.source_time(TrackId(1), 5.0), None);
    assert_eq!(plan.source_time(TrackId(1), -0.1), None);
    assert_eq!(plan.source_time(TrackId(7), 1.0), None);
}

#[test]
fn hold_last_inserts_once_and_clamps() {
    let mut s = scene(5.0);
    s.add_source(&LayerObjectIndex::new(vec![], 0), clip("a.mp4", 2.0), rect(), 0.0)
        .unwrap();
    let assigned = assign_track_ids(&mut s);
    let plan = TrackPlan::build(&s, &assigned, ExternalLoopPolicy::HoldLast).unwrap();

    assert_eq!(plan.policy(), ExternalLoopPolicy::HoldLast);
    assert_eq!(plan.tracks()[0].segments.len(), 1);
    assert_eq!(plan.tracks()[0].segments[0].duration, 2.0);
    assert_eq!(plan.source_time(TrackId(1), 4.5), Some(2.0));
    assert_eq!(plan.source_time(TrackId(1), 0.5), Some(0.5));
}

#[test]
fn scenes_without_video_get_a_blank_track() {
    let s = scene(3.0);
    let plan = TrackPlan::build(&s, &[], ExternalLoopPolicy::Loop).unwrap();
    assert_eq!(plan.track_ids(), vec![TrackId(1)]);
    assert_eq!(plan.tracks()[0].content, TrackContent::Blank);
    assert_eq!(plan.tracks()[0].segments[0].duration, 3.0);
    assert_eq!(plan.duration(), 3.0);
    assert_eq!(plan.source_time(TrackId(1), 2.0), Some(2.0));
}

#[test]
fn clips_without_duration_are_rejected() {
    let s = scene(3.0);
    let bad = TrackAssignment {
        track_id: TrackId(1),
        path: None,
        duration: 0.0,
        natural_size: Size::new(1.0, 1.0),
    };
    let err = TrackPlan::build(&s, &[bad], ExternalLoopPolicy::Loop).unwrap_err();
    assert!(matches!(err, ScenecraftError::Validation(_)));
}
