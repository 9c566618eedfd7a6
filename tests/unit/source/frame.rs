use super::*;

#[test]
fn buffer_frame_premultiplies_on_conversion() {
    let buf = PixelBuffer::from_raw(1, 1, vec![255, 0, 0, 128], false).unwrap();
    let frame = Frame::from_buffer(Arc::new(buf), Some(0.5));
    assert_eq!(frame.timestamp(), Some(0.5));
    assert_eq!(frame.size(), Size::new(1.0, 1.0));
    let raster = frame.to_raster().unwrap();
    assert_eq!(raster.pixel_at(0, 0), [128, 0, 0, 128]);
    assert!(!frame.to_pixel_buffer().unwrap().premultiplied);
}

#[test]
fn image_frame_is_reanchored_at_origin() {
    let raster = Raster::from_premul(2, 1, vec![9; 8]).unwrap().at(5, 5);
    let frame = Frame::from_raster(raster, None);
    assert_eq!(frame.timestamp(), None);
    let out = frame.to_raster().unwrap();
    assert_eq!(out.origin(), (0, 0));
    assert_eq!(frame.to_rgba_image().unwrap().dimensions(), (2, 1));
}
