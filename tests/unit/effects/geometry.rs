use super::*;
use crate::foundation::core::Rgba8Premul;
use crate::render::context::Sampling;

fn nearest() -> RenderSettings {
    RenderSettings {
        sampling: Sampling::Nearest,
        ..RenderSettings::default()
    }
}

fn red_blue() -> Raster {
    Raster::from_premul(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap()
}

#[test]
fn fade_scales_alpha() {
    let img = Raster::solid(1, 1, Rgba8Premul::from_straight_rgba(255, 255, 255, 255)).unwrap();
    let out = Fade::new(0.5)
        .apply(&img, FilterTimes::default(), &nearest())
        .unwrap();
    assert_eq!(out.pixel_at(0, 0), [128, 128, 128, 128]);
}

#[test]
fn rotate_half_turn_about_center_swaps_pixels() {
    let out = Rotate::new(std::f64::consts::PI, Point::new(1.0, 0.5))
        .apply(&red_blue(), FilterTimes::default(), &nearest())
        .unwrap();
    assert_eq!(out.origin(), (0, 0));
    assert_eq!((out.width(), out.height()), (2, 1));
    assert_eq!(out.pixel_at(0, 0), [0, 0, 255, 255]);
    assert_eq!(out.pixel_at(1, 0), [255, 0, 0, 255]);
}

#[test]
fn scale_about_origin_grows_extent() {
    let img = Raster::solid(2, 2, Rgba8Premul::from_straight_rgba(0, 255, 0, 255)).unwrap();
    let out = Scale::new(2.0, Point::ZERO)
        .apply(&img, FilterTimes::default(), &nearest())
        .unwrap();
    assert_eq!(out.origin(), (0, 0));
    assert_eq!((out.width(), out.height()), (4, 4));
    assert_eq!(out.pixel_at(3, 3), [0, 255, 0, 255]);
}

#[test]
fn translate_moves_origin() {
    let mut t = Translate::default();
    t.update_property(
        FilterProperty::Translation,
        PropertyValue::Point(Point::new(3.0, -2.0)),
    );
    let out = t
        .apply(&red_blue(), FilterTimes::default(), &nearest())
        .unwrap();
    assert_eq!(out.origin(), (3, -2));
    assert_eq!(out.pixel_at(4, -2), [0, 0, 255, 255]);
}

#[test]
fn zero_scale_collapses() {
    let out = Scale::new(0.0, Point::ZERO)
        .apply(&red_blue(), FilterTimes::default(), &nearest())
        .unwrap();
    assert!(out.is_empty());
}
