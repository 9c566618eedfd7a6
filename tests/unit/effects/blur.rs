use super::*;
use crate::foundation::core::Rgba8Premul;

fn square() -> Raster {
    Raster::solid(4, 4, Rgba8Premul::from_straight_rgba(255, 0, 0, 255)).unwrap()
}

#[test]
fn extent_grows_by_radius() {
    let mut blur = GaussianBlur::new(2.0);
    let out = blur
        .apply(&square(), FilterTimes::default(), &RenderSettings::default())
        .unwrap();
    assert_eq!(out.origin(), (-2, -2));
    assert_eq!((out.width(), out.height()), (8, 8));
}

#[test]
fn coverage_spreads_past_the_edge() {
    let mut blur = GaussianBlur::new(2.0);
    let out = blur
        .apply(&square(), FilterTimes::default(), &RenderSettings::default())
        .unwrap();
    let inside = out.pixel_at(1, 1);
    assert!(inside[3] > 200 && inside[3] < 255, "{inside:?}");
    assert!(out.pixel_at(-1, 1)[3] > 0);
    let px = out.pixel_at(-1, 1);
    assert!(px[0] <= px[3]);
}

#[test]
fn zero_radius_is_identity() {
    let mut blur = GaussianBlur::new(0.0);
    let out = blur
        .apply(&square(), FilterTimes::default(), &RenderSettings::default())
        .unwrap();
    assert_eq!(out, square());
}

#[test]
fn radius_is_animatable() {
    let mut blur = GaussianBlur::default();
    assert_eq!(blur.radius, 10.0);
    blur.add_animator(FilterAnimator::scalar(FilterProperty::Radius, 0.0, 4.0, 0.0, 1.0).unwrap());
    blur.animate(0.5);
    assert_eq!(blur.radius, 2.0);
}
