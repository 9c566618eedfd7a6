use std::io::Cursor;

use super::*;

fn encode_gif(frames: &[([u8; 4], u32)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = image::codecs::gif::GifEncoder::new(&mut buf);
        for &(px, delay_ms) in frames {
            let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(px));
            let frame =
                image::Frame::from_parts(img, 0, 0, image::Delay::from_numer_denom_ms(delay_ms, 1));
            enc.encode_frame(frame).unwrap();
        }
    }
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let raster = decode_image(&buf).unwrap();
    assert_eq!(raster.width(), 1);
    assert_eq!(raster.height(), 1);
    assert_eq!(
        raster.data(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(matches!(
        decode_image(b"not an image"),
        Err(ScenecraftError::Decode(_))
    ));
}

#[test]
fn decode_gif_reads_frames_and_delays() {
    let bytes = encode_gif(&[([255, 0, 0, 255], 100), ([0, 0, 255, 255], 200)]);
    let frames = decode_gif(&bytes).unwrap();
    assert_eq!(frames.len(), 2);
    assert!((frames[0].1 - 0.1).abs() < 1e-9);
    assert!((frames[1].1 - 0.2).abs() < 1e-9);
    assert_eq!(frames[1].0.pixel_at(0, 0)[2], 255);
}

#[test]
fn zero_gif_delay_falls_back_to_default() {
    assert_eq!(gif_delay(0.0), GIF_DEFAULT_DELAY_SECS);
    assert_eq!(gif_delay(f64::NAN), GIF_DEFAULT_DELAY_SECS);
    assert_eq!(gif_delay(0.04), 0.04);
}

#[test]
fn read_asset_reports_missing_files() {
    let err = read_asset(Path::new("target/does/not/exist.png")).unwrap_err();
    assert!(err.to_string().contains("exist.png"));
}
