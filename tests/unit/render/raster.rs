use super::*;
use crate::foundation::core::Vec2;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(w: u32, h: u32, px: [u8; 4]) -> Raster {
    Raster::from_premul(w, h, px.repeat((w * h) as usize)).unwrap()
}

#[test]
fn from_premul_rejects_wrong_length() {
    assert!(Raster::from_premul(2, 2, vec![0; 15]).is_err());
}

#[test]
fn pixel_at_is_transparent_outside_extent() {
    let r = solid(2, 2, RED).at(10, 10);
    assert_eq!(r.pixel_at(10, 10), RED);
    assert_eq!(r.pixel_at(11, 11), RED);
    assert_eq!(r.pixel_at(9, 10), [0; 4]);
    assert_eq!(r.pixel_at(12, 10), [0; 4]);
    assert_eq!(r.extent(), Rect::new(10.0, 10.0, 12.0, 12.0));
}

#[test]
fn integer_translation_moves_origin_without_resampling() {
    let r = solid(3, 2, RED);
    let moved = r
        .transformed(
            Affine::translate(Vec2::new(5.0, -4.0)),
            &RenderSettings::default(),
        )
        .unwrap();
    assert_eq!(moved.origin(), (5, -4));
    assert_eq!(moved.data(), r.data());
}

#[test]
fn scale_fills_target_extent() {
    let r = solid(2, 2, RED);
    let out = r
        .transformed(
            Affine::scale_non_uniform(3.0, 2.0),
            &RenderSettings::default(),
        )
        .unwrap();
    assert_eq!(out.extent(), Rect::new(0.0, 0.0, 6.0, 4.0));
    assert_eq!(out.pixel_at(3, 2), RED);
    assert_eq!(out.pixel_at(0, 0)[3], 255);
}

#[test]
fn quarter_turn_swaps_dimensions() {
    let r = solid(4, 2, RED);
    let out = r
        .transformed(
            Affine::rotate(std::f64::consts::FRAC_PI_2),
            &RenderSettings {
                sampling: Sampling::Nearest,
                ..RenderSettings::default()
            },
        )
        .unwrap();
    assert_eq!(out.width(), 2);
    assert_eq!(out.height(), 4);
    assert_eq!(out.pixel_at(-1, 1), RED);
}

#[test]
fn degenerate_transform_yields_empty_raster() {
    let r = solid(4, 4, RED);
    let out = r
        .transformed(Affine::scale(0.0), &RenderSettings::default())
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn oversized_transform_is_rejected() {
    let r = solid(4, 4, RED);
    let settings = RenderSettings {
        max_dimension: 16,
        ..RenderSettings::default()
    };
    assert!(r.transformed(Affine::scale(10.0), &settings).is_err());
}

#[test]
fn composited_over_covers_union_and_puts_self_on_top() {
    let below = solid(4, 4, BLUE);
    let top = solid(4, 4, RED).at(2, 2);
    let out = top.composited_over(&below, 1024).unwrap();
    assert_eq!(out.extent(), Rect::new(0.0, 0.0, 6.0, 6.0));
    assert_eq!(out.pixel_at(0, 0), BLUE);
    assert_eq!(out.pixel_at(3, 3), RED);
    assert_eq!(out.pixel_at(5, 5), RED);
    assert_eq!(out.pixel_at(5, 0), [0; 4]);
}

#[test]
fn composited_over_rejects_oversized_union() {
    let below = solid(4, 4, BLUE);
    let top = solid(4, 4, RED).at(100, 0);
    assert!(top.composited_over(&below, 64).is_err());
    assert!(top.composited_over(&below, 104).is_ok());
}

#[test]
fn with_opacity_scales_all_channels() {
    let out = solid(1, 1, [200, 100, 0, 200]).with_opacity(0.5);
    assert_eq!(out.data(), &[100, 50, 0, 100]);
}

#[test]
fn map_straight_keeps_alpha() {
    let out = solid(1, 1, [100, 0, 0, 200]).map_straight(|[r, g, b]| [g, r, b]);
    assert_eq!(out.data(), &[0, 100, 0, 200]);
}

#[test]
fn padded_grows_extent_symmetrically() {
    let out = solid(2, 2, RED).padded(3).unwrap();
    assert_eq!(out.extent(), Rect::new(-3.0, -3.0, 5.0, 5.0));
    assert_eq!(out.pixel_at(0, 0), RED);
    assert_eq!(out.pixel_at(-1, -1), [0; 4]);
}

#[test]
fn canvas_buffer_crops_and_clears() {
    let r = solid(2, 2, RED).at(1, 1);
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let buf = r.to_canvas_buffer(canvas, Some([0, 0, 0, 255])).unwrap();
    assert_eq!(buf.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(buf.pixel(1, 1), Some(RED));
    assert!(buf.premultiplied);
}

#[test]
fn rgba_image_is_straight_alpha() {
    let img = solid(1, 1, [64, 0, 0, 128]).to_rgba_image().unwrap();
    let px = img.get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!((i32::from(px[0]) - 128).abs() <= 1);
}
