use super::*;
use crate::foundation::core::{Canvas, Fps};

#[test]
fn in_memory_factory_records_every_output() {
    let factory = InMemoryEncoderFactory::new();
    let opts = VideoWriterOpts::new(
        "a.mp4",
        Canvas::new(8, 6).unwrap(),
        Fps::new(10, 1).unwrap(),
    );
    let mut video = factory.video_writer(opts).unwrap();
    let mut gif = factory.gif_writer(Path::new("b.gif"), 3).unwrap();

    video.start().unwrap();
    let frame = video.allocate_buffer().unwrap();
    video.append(&frame, 0.0).unwrap();
    video.append(&frame, 0.1).unwrap();
    video.finish().unwrap();
    gif.add_frame(&frame, 0.1).unwrap();
    gif.finalize().unwrap();

    let outputs = factory.outputs();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].path(), Path::new("a.mp4"));
    assert_eq!(outputs[0].frame_count(), 2);
    assert!(matches!(outputs[1], RecordedOutput::Gif { .. }));
    assert_eq!(outputs[1].frame_count(), 1);
}

#[test]
fn in_memory_factory_passes_back_pressure_to_writers() {
    let factory = InMemoryEncoderFactory::new().with_busy_polls(1);
    let opts = VideoWriterOpts::new(
        "a.mp4",
        Canvas::new(4, 4).unwrap(),
        Fps::new(10, 1).unwrap(),
    );
    let mut video = factory.video_writer(opts).unwrap();
    video.start().unwrap();
    let frame = video.allocate_buffer().unwrap();
    video.append(&frame, 0.0).unwrap();
    assert!(!video.is_ready_for_more_data());
    assert!(video.is_ready_for_more_data());
}

#[test]
fn system_factory_validates_video_size_up_front() {
    let opts = VideoWriterOpts::new(
        std::env::temp_dir().join("scenecraft-never-written.mp4"),
        Canvas::new(1, 9).unwrap(),
        Fps::new(10, 1).unwrap(),
    );
    assert!(SystemEncoderFactory.video_writer(opts).is_err());
}
