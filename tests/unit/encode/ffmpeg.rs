use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn rotation_metadata_only_for_rotating_transforms() {
    assert_eq!(rotation_degrees(Affine::IDENTITY), None);
    assert_eq!(rotation_degrees(Affine::translate((5.0, 5.0))), None);
    assert_eq!(
        rotation_degrees(Affine::rotate(std::f64::consts::FRAC_PI_2)),
        Some(90)
    );
    assert_eq!(
        rotation_degrees(Affine::rotate(-std::f64::consts::FRAC_PI_2)),
        Some(270)
    );
}

#[test]
fn open_rejects_tiny_sizes() {
    let dir = std::env::temp_dir().join(format!("scenecraft-ffmpeg-{}", uuid::Uuid::new_v4()));
    let opts = VideoWriterOpts::new(
        dir.join("out.mp4"),
        Canvas::new(1, 1).unwrap(),
        Fps::new(30, 1).unwrap(),
    );
    assert!(matches!(
        FfmpegVideoWriter::open(opts),
        Err(ScenecraftError::Validation(_))
    ));
}

#[test]
fn open_refuses_existing_output_without_overwrite() {
    let dir = std::env::temp_dir().join(format!("scenecraft-ffmpeg-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("exists.mp4");
    std::fs::write(&path, b"x").unwrap();
    let mut opts = VideoWriterOpts::new(&path, Canvas::new(8, 8).unwrap(), Fps::new(30, 1).unwrap());
    opts.overwrite = false;
    assert!(FfmpegVideoWriter::open(opts).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn open_floors_size_and_stays_idle() {
    let dir = std::env::temp_dir().join(format!("scenecraft-ffmpeg-{}", uuid::Uuid::new_v4()));
    let opts = VideoWriterOpts::new(
        dir.join("nested").join("out.mp4"),
        Canvas::new(33, 17).unwrap(),
        Fps::new(30, 1).unwrap(),
    );
    let mut writer = FfmpegVideoWriter::open(opts).unwrap();
    assert_eq!(writer.size(), Canvas::new(32, 16).unwrap());
    assert_eq!(writer.state(), WriterState::Idle);
    assert!(!writer.is_ready_for_more_data());
    assert!(dir.join("nested").is_dir());

    let buf = writer.allocate_buffer().unwrap();
    assert!(matches!(
        writer.append(&buf, 0.0),
        Err(ScenecraftError::Encode(_))
    ));
    assert!(writer.finish().is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
