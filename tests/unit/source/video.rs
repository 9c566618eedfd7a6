use std::sync::Mutex;

use super::*;

struct ScriptedDecoder {
    info: VideoInfo,
    times: Vec<f64>,
    cursor: usize,
    restarts: Arc<Mutex<u32>>,
}

impl ScriptedDecoder {
    fn boxed(times: Vec<f64>, duration: f64) -> (Box<dyn VideoDecoder>, Arc<Mutex<u32>>) {
        let restarts = Arc::new(Mutex::new(0));
        let dec = ScriptedDecoder {
            info: VideoInfo {
                path: None,
                duration,
                frame_rate: 10.0,
                natural_size: Size::new(1.0, 1.0),
                transform: Affine::IDENTITY,
            },
            times,
            cursor: 0,
            restarts: Arc::clone(&restarts),
        };
        (Box::new(dec), restarts)
    }
}

impl VideoDecoder for ScriptedDecoder {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> ScenecraftResult<Option<(PixelBuffer, f64)>> {
        let Some(&t) = self.times.get(self.cursor) else {
            return Ok(None);
        };
        let tag = self.cursor as u8;
        self.cursor += 1;
        Ok(Some((
            PixelBuffer::from_raw(1, 1, vec![tag, 0, 0, 255], false).unwrap(),
            t,
        )))
    }

    fn restart(&mut self) -> ScenecraftResult<()> {
        self.cursor = 0;
        *self.restarts.lock().unwrap() += 1;
        Ok(())
    }
}

fn tag(frame: Option<Frame>) -> u8 {
    frame.unwrap().to_pixel_buffer().unwrap().data[0]
}

#[test]
fn self_managed_video_walks_window_and_restarts() {
    let (dec, restarts) = ScriptedDecoder::boxed(vec![0.0, 0.1, 0.2], 0.3);
    let mut src = VideoSource::open(dec).unwrap();

    assert_eq!(tag(src.frame_at(0.0, None)), 0);
    assert_eq!(tag(src.frame_at(0.05, None)), 0);
    // Leaving the cached window advances the cursor by one frame.
    assert_eq!(tag(src.frame_at(0.1, None)), 2);
    assert_eq!(tag(src.frame_at(0.15, None)), 1);
    // End of stream: reopen and hand back the previous "last" frame.
    assert_eq!(tag(src.frame_at(0.25, None)), 2);
    assert_eq!(*restarts.lock().unwrap(), 1);
    // Requests wrap modulo the duration.
    assert_eq!(tag(src.frame_at(0.31, None)), 0);
}

#[test]
fn single_frame_video_always_returns_it() {
    let (dec, _) = ScriptedDecoder::boxed(vec![0.0], 1.0);
    let mut src = VideoSource::open(dec).unwrap();
    assert_eq!(tag(src.frame_at(0.7, None)), 0);
    assert_eq!(tag(src.frame_at(5.0, None)), 0);
}

#[test]
fn empty_video_fails_to_open() {
    let (dec, _) = ScriptedDecoder::boxed(Vec::new(), 1.0);
    assert!(matches!(
        VideoSource::open(dec),
        Err(ScenecraftError::Decode(_))
    ));
}

#[test]
fn external_video_reads_only_its_track() {
    let info = VideoInfo {
        path: None,
        duration: 1.0,
        frame_rate: 30.0,
        natural_size: Size::ZERO,
        transform: Affine::IDENTITY,
    };
    let mut src = VideoSource::external(TrackId(7), info);
    assert_eq!(src.natural_size(), DEFAULT_NATURAL_SIZE);
    assert!(src.frame_at(0.0, None).is_none());

    let mut frames = ExternalFrames::new();
    frames.insert(
        TrackId(3),
        Arc::new(PixelBuffer::from_raw(1, 1, vec![3, 0, 0, 255], false).unwrap()),
    );
    assert!(src.frame_at(0.0, Some(&frames)).is_none());
    frames.insert(
        TrackId(7),
        Arc::new(PixelBuffer::from_raw(1, 1, vec![7, 0, 0, 255], false).unwrap()),
    );
    let frame = src.frame_at(0.4, Some(&frames)).unwrap();
    assert_eq!(frame.timestamp(), Some(0.4));
    assert_eq!(tag(Some(frame)), 7);
}

#[test]
fn feeding_externally_switches_mode() {
    let (dec, _) = ScriptedDecoder::boxed(vec![0.0, 0.1], 0.2);
    let mut src = VideoSource::open(dec).unwrap();
    assert!(src.is_self_managed());
    src.feed_externally(TrackId(1));
    assert_eq!(src.track_id(), Some(TrackId(1)));
    assert!(src.frame_at(0.0, None).is_none());
}
