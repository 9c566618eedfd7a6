use super::*;
use crate::animation::tween::CubicBezier;

#[derive(Debug)]
struct Overshoot;

impl TweenFunction for Overshoot {
    fn tween(&self, x: f64) -> f64 {
        x * 1.5
    }
}

#[test]
fn boundaries_hold_exactly() {
    let anim = FilterAnimator::scalar(FilterProperty::Radius, 2.0, 10.0, 1.0, 3.0)
        .unwrap()
        .with_tween(Arc::new(CubicBezier::ease_in_out()));
    assert_eq!(anim.value_at(1.0), PropertyValue::Scalar(2.0));
    assert_eq!(anim.value_at(3.0), PropertyValue::Scalar(10.0));
    assert_eq!(anim.value_at(-5.0), PropertyValue::Scalar(2.0));
    assert_eq!(anim.value_at(99.0), PropertyValue::Scalar(10.0));
}

#[test]
fn linear_midpoint() {
    let anim = FilterAnimator::scalar(FilterProperty::Fade, 0.0, 1.0, 0.0, 2.0).unwrap();
    assert_eq!(anim.value_at(0.5), PropertyValue::Scalar(0.25));
}

#[test]
fn points_interpolate_componentwise() {
    let anim = FilterAnimator::point(
        FilterProperty::Translation,
        Point::new(0.0, 10.0),
        Point::new(100.0, -10.0),
        0.0,
        4.0,
    )
    .unwrap();
    assert_eq!(
        anim.value_at(1.0),
        PropertyValue::Point(Point::new(25.0, 5.0))
    );
}

#[test]
fn rects_interpolate() {
    let anim = FilterAnimator::new(
        FilterProperty::CenterPoint,
        AnimatedRange::Rect {
            start: Rect::new(0.0, 0.0, 10.0, 10.0),
            end: Rect::new(10.0, 10.0, 30.0, 30.0),
        },
        0.0,
        1.0,
        Arc::new(Linear),
    )
    .unwrap();
    assert_eq!(
        anim.value_at(0.5),
        PropertyValue::Rect(Rect::new(5.0, 5.0, 20.0, 20.0))
    );
}

#[test]
fn overshoot_is_not_reclamped() {
    let anim = FilterAnimator::scalar(FilterProperty::Scale, 0.0, 10.0, 0.0, 1.0)
        .unwrap()
        .with_tween(Arc::new(Overshoot));
    assert_eq!(anim.value_at(1.0), PropertyValue::Scalar(15.0));
    assert_eq!(anim.value_at(2.0), PropertyValue::Scalar(15.0));
}

#[test]
fn degenerate_window_jumps() {
    let anim = FilterAnimator::scalar(FilterProperty::Fade, 0.0, 1.0, 2.0, 2.0).unwrap();
    assert_eq!(anim.value_at(1.9), PropertyValue::Scalar(0.0));
    assert_eq!(anim.value_at(2.0), PropertyValue::Scalar(1.0));
}

#[test]
fn invalid_windows_are_rejected() {
    assert!(FilterAnimator::scalar(FilterProperty::Fade, 0.0, 1.0, 3.0, 2.0).is_err());
    assert!(FilterAnimator::scalar(FilterProperty::Fade, 0.0, 1.0, f64::NAN, 2.0).is_err());
    assert!(FilterAnimator::scalar(FilterProperty::Fade, f64::INFINITY, 1.0, 0.0, 2.0).is_err());
}

#[test]
fn ids_are_unique_unless_set() {
    let a = FilterAnimator::scalar(FilterProperty::Fade, 0.0, 1.0, 0.0, 1.0).unwrap();
    let b = FilterAnimator::scalar(FilterProperty::Fade, 0.0, 1.0, 0.0, 1.0).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(a.with_id("fade-in").id(), "fade-in");
}

#[test]
fn lerp_trait_covers_kurbo_types() {
    let p = <Point as Lerp>::lerp(&Point::new(0.0, 0.0), &Point::new(10.0, -4.0), 0.25);
    assert_eq!(p, Point::new(2.5, -1.0));
    let r = <Rect as Lerp>::lerp(
        &Rect::new(0.0, 0.0, 10.0, 10.0),
        &Rect::new(10.0, 10.0, 30.0, 50.0),
        0.5,
    );
    assert_eq!(r, Rect::new(5.0, 5.0, 20.0, 30.0));
}
