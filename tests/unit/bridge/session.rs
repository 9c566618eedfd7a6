use super::*;
use crate::foundation::core::{Affine, Fps, Rect, Size};
use crate::scene::scene::LayerObjectIndex;
use crate::source::video::{VideoDecoder, VideoInfo, VideoSource};

struct OneFrame {
    info: VideoInfo,
    served: bool,
}

impl VideoDecoder for OneFrame {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> ScenecraftResult<Option<(PixelBuffer, f64)>> {
        if self.served {
            return Ok(None);
        }
        self.served = true;
        Ok(Some((PixelBuffer::transparent(2, 2)?, 0.0)))
    }

    fn restart(&mut self) -> ScenecraftResult<()> {
        self.served = false;
        Ok(())
    }
}

fn video_scene() -> Scene {
    let decoder = OneFrame {
        info: VideoInfo {
            path: None,
            duration: 1.0,
            frame_rate: 10.0,
            natural_size: Size::new(2.0, 2.0),
            transform: Affine::IDENTITY,
        },
        served: false,
    };
    let mut scene = Scene::new(2.0, Fps::new(10, 1).unwrap())
        .unwrap()
        .with_canvas(Canvas::new(4, 4).unwrap());
    scene
        .add_source(
            &LayerObjectIndex::new(vec![], 0),
            Box::new(VideoSource::open(Box::new(decoder)).unwrap()),
            Rect::new(0.0, 0.0, 4.0, 4.0),
            0.0,
        )
        .unwrap();
    scene
}

fn red_frame() -> Arc<PixelBuffer> {
    Arc::new(PixelBuffer::from_raw(2, 2, [255, 0, 0, 255].repeat(4), false).unwrap())
}

fn request(time: f64, frame: Option<Arc<PixelBuffer>>) -> CompositionRequest {
    let mut source_frames = ExternalFrames::new();
    if let Some(frame) = frame {
        source_frames.insert(TrackId(1), frame);
    }
    CompositionRequest {
        composition_time: time,
        required_track_ids: vec![TrackId(1)],
        source_frames,
    }
}

fn bridge(scene: Scene) -> SceneBridge {
    SceneBridge::new(scene, CompositingContext::default().shared(), Canvas::new(4, 4).unwrap())
        .unwrap()
}

#[test]
fn renders_external_frames_into_the_scene() {
    let bridge = bridge(video_scene());
    assert_eq!(bridge.assignments().len(), 1);
    assert_eq!(bridge.plan().track_ids(), vec![TrackId(1)]);

    let out = bridge.handle(&request(0.0, Some(red_frame()))).unwrap();
    assert!(!out.is_passthrough());
    let buf = out.buffer();
    assert_eq!((buf.width, buf.height), (4, 4));
    assert_eq!(buf.pixel(1, 1), Some([255, 0, 0, 255]));
}

#[test]
fn empty_render_passes_the_first_track_through() {
    let scene = Scene::new(1.0, Fps::new(10, 1).unwrap()).unwrap();
    let bridge = bridge(scene);
    let frame = red_frame();
    let out = bridge.handle(&request(0.5, Some(Arc::clone(&frame)))).unwrap();
    match out {
        BridgeOutput::Passthrough(buf) => assert!(Arc::ptr_eq(&buf, &frame)),
        other => panic!("expected passthrough, got {other:?}"),
    }
}

#[test]
fn requests_without_tracks_or_frames_fail() {
    let bridge = bridge(video_scene());
    let mut empty = request(0.0, Some(red_frame()));
    empty.required_track_ids.clear();
    assert!(matches!(
        bridge.handle(&empty),
        Err(BridgeError::NoRequiredTracks)
    ));
    assert!(matches!(
        bridge.handle(&request(0.0, None)),
        Err(BridgeError::MissingSourceFrame(TrackId(1)))
    ));
}

#[test]
fn loop_policy_is_configurable() {
    let bridge = bridge(video_scene())
        .with_loop_policy(ExternalLoopPolicy::HoldLast)
        .unwrap();
    assert_eq!(bridge.plan().policy(), ExternalLoopPolicy::HoldLast);
    assert_eq!(bridge.plan().source_time(TrackId(1), 1.5), Some(1.0));
}

#[test]
fn queue_delivers_results_in_order() {
    let bridge = Arc::new(bridge(video_scene()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let queue = BridgeQueue::new(bridge, move |time, outcome| {
        sink.lock().unwrap().push((time, outcome.is_ok()));
    })
    .unwrap();

    queue.submit(request(0.0, Some(red_frame()))).unwrap();
    queue.submit(request(0.1, None)).unwrap();
    queue.submit(request(0.2, Some(red_frame()))).unwrap();
    queue.shutdown().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![(0.0, true), (0.1, false), (0.2, true)]);
}
