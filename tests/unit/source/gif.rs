use super::*;

fn tagged(tag: u8) -> Raster {
    Raster::from_premul(1, 1, vec![tag, 0, 0, 255]).unwrap()
}

fn three_frame_gif() -> Arc<GifImage> {
    Arc::new(
        GifImage::from_frames(vec![(tagged(0), 0.1), (tagged(1), 0.2), (tagged(2), 0.3)])
            .unwrap(),
    )
}

fn tag_at(src: &mut GifSource, t: f64) -> Option<u8> {
    src.frame_at(t, None)
        .map(|f| f.to_raster().unwrap().pixel_at(0, 0)[0])
}

#[test]
fn looping_gif_maps_times_to_frames() {
    let mut src = GifSource::new(three_frame_gif(), true);
    assert_eq!(tag_at(&mut src, 0.05), Some(0));
    assert_eq!(tag_at(&mut src, 0.25), Some(1));
    assert_eq!(tag_at(&mut src, 0.65), Some(0));
    assert_eq!(tag_at(&mut src, 0.45), Some(2));
}

#[test]
fn boundary_belongs_to_next_frame() {
    let gif = three_frame_gif();
    assert_eq!(gif.frame_index_at(0.0, false), Some(0));
    assert_eq!(gif.frame_index_at(0.1, false), Some(1));
    assert_eq!(gif.frame_index_at(1.25, true), Some(0));
}

#[test]
fn non_looping_gif_ends() {
    let mut src = GifSource::new(three_frame_gif(), false);
    assert_eq!(tag_at(&mut src, 0.59), Some(2));
    assert_eq!(tag_at(&mut src, 0.65), None);
    assert_eq!(tag_at(&mut src, -0.1), None);
}

#[test]
fn empty_gif_is_rejected() {
    assert!(matches!(
        GifImage::from_frames(Vec::new()),
        Err(ScenecraftError::Decode(_))
    ));
    assert!(GifImage::from_frames(vec![(tagged(0), f64::NAN)]).is_err());
}

#[test]
fn duration_sums_delays() {
    let gif = three_frame_gif();
    assert!((gif.duration() - 0.6).abs() < 1e-12);
    assert_eq!(gif.frame_count(), 3);
}
